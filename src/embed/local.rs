use std::cell::RefCell;
use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::{debug, info};

use crate::config::EmbeddingModelKind;
use crate::error::{Error, Result};

use super::Embedder;

/// Sentence embedder running a fastembed ONNX model in-process.
pub struct LocalEmbedder {
    model: RefCell<TextEmbedding>,
    dimension: usize,
    batch_size: usize,
}

impl LocalEmbedder {
    /// Load (downloading on first use) the given model.
    pub fn load(
        kind: EmbeddingModelKind,
        cache_dir: Option<PathBuf>,
        batch_size: usize,
    ) -> Result<Self> {
        info!(model = kind.as_str(), "loading embedding model");
        let mut options = InitOptions::new(model_for(kind)).with_show_download_progress(true);
        if let Some(dir) = cache_dir {
            options = options.with_cache_dir(dir);
        }
        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| Error::Embedding(format!("failed to load {}: {e}", kind.as_str())))?;

        // Probe once so the dimension comes from the model itself.
        let probe = model
            .embed(vec!["dimension probe"], None)
            .map_err(|e| Error::Embedding(e.to_string()))?;
        let dimension = probe
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::Embedding("model returned no vector".into()))?;
        debug!(dimension, "embedding model ready");

        Ok(Self {
            model: RefCell::new(model),
            dimension,
            batch_size,
        })
    }
}

impl Embedder for LocalEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.model
            .borrow_mut()
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| Error::Embedding(e.to_string()))
    }
}

fn model_for(kind: EmbeddingModelKind) -> EmbeddingModel {
    match kind {
        EmbeddingModelKind::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        EmbeddingModelKind::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
    }
}
