//! Vector store contract, its Qdrant and in-memory backends, and the
//! collection readiness checks built on top.

mod client;
pub mod memory;
mod readiness;
mod types;

pub use client::QdrantStore;
pub use memory::MemoryStore;
pub use readiness::{collection_exists, collection_populated, wait_for_service};
pub use types::{CollectionInfo, Distance, Point, PointId, ScoredPoint, VectorParams};

use crate::error::Result;

/// Operations the loader needs from a vector database.
pub trait VectorStore {
    fn list_collections(&self) -> Result<Vec<String>>;

    /// Fails with `CollectionNotFound` for an unknown collection.
    fn collection_info(&self, name: &str) -> Result<CollectionInfo>;

    fn create_collection(&self, name: &str, params: VectorParams) -> Result<()>;

    /// Write all `points`. Backends may split the write into several
    /// requests; a failed request fails the whole call.
    fn upload_points(&self, name: &str, points: &[Point]) -> Result<()>;

    /// Nearest neighbours of `vector`, best first, with payloads.
    fn search(&self, name: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>>;

    fn delete_collection(&self, name: &str) -> Result<()>;
}
