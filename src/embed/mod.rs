//! Text embedding contract and the local ONNX-backed implementation.

mod local;

pub use local::LocalEmbedder;

use crate::error::Result;

/// Maps text to fixed-length vectors.
pub trait Embedder {
    /// Length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// One vector per input, in input order.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.encode(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("model returned no vector".into()))
    }
}
