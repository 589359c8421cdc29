use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Similarity metric a collection is indexed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distance {
    Cosine,
    Euclid,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: Distance,
}

/// Summary of one collection as reported by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionInfo {
    #[serde(default)]
    pub points_count: Option<u64>,
}

impl CollectionInfo {
    pub fn record_count(&self) -> u64 {
        self.points_count.unwrap_or(0)
    }
}

/// One record: positional id, embedding, and the source row as payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Map<String, Value>,
}

/// Point ids may be unsigned integers or UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScoredPoint {
    pub id: PointId,
    pub score: f32,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
}
