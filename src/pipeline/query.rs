use crate::embed::Embedder;
use crate::error::Result;
use crate::store::{ScoredPoint, VectorStore};

/// Embed `query` and return the `limit` nearest records of `collection`.
pub fn search(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    collection: &str,
    query: &str,
    limit: u64,
) -> Result<Vec<ScoredPoint>> {
    let vector = embedder.encode_one(query)?;
    store.search(collection, &vector, limit)
}

/// Display text for a hit: the `column` payload value, or the whole
/// payload as JSON when that column is missing.
pub fn hit_text(hit: &ScoredPoint, column: &str) -> String {
    let Some(payload) = &hit.payload else {
        return String::new();
    };
    match payload.get(column) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => serde_json::Value::Object(payload.clone()).to_string(),
    }
}
