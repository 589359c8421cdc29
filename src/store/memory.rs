//! In-process [`VectorStore`] with exact search, for tests and offline runs.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

use super::VectorStore;
use super::types::{CollectionInfo, Distance, Point, PointId, ScoredPoint, VectorParams};

#[derive(Debug)]
struct Collection {
    params: VectorParams,
    points: BTreeMap<u64, Point>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RefCell<BTreeMap<String, Collection>>,
    upload_calls: RefCell<usize>,
    create_calls: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `upload_points` calls seen so far.
    pub fn upload_calls(&self) -> usize {
        *self.upload_calls.borrow()
    }

    /// Number of `create_collection` calls seen so far.
    pub fn create_calls(&self) -> usize {
        *self.create_calls.borrow()
    }

    pub fn params(&self, name: &str) -> Option<VectorParams> {
        self.collections.borrow().get(name).map(|c| c.params)
    }

    /// Stored points of a collection in id order.
    pub fn points(&self, name: &str) -> Vec<Point> {
        self.collections
            .borrow()
            .get(name)
            .map(|c| c.points.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl VectorStore for MemoryStore {
    fn list_collections(&self) -> Result<Vec<String>> {
        Ok(self.collections.borrow().keys().cloned().collect())
    }

    fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        let collections = self.collections.borrow();
        let collection = collections
            .get(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        Ok(CollectionInfo {
            points_count: Some(collection.points.len() as u64),
        })
    }

    fn create_collection(&self, name: &str, params: VectorParams) -> Result<()> {
        *self.create_calls.borrow_mut() += 1;
        let mut collections = self.collections.borrow_mut();
        if collections.contains_key(name) {
            return Err(Error::Store {
                status: 409,
                body: format!("collection `{name}` already exists"),
            });
        }
        collections.insert(
            name.to_string(),
            Collection {
                params,
                points: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn upload_points(&self, name: &str, points: &[Point]) -> Result<()> {
        *self.upload_calls.borrow_mut() += 1;
        let mut collections = self.collections.borrow_mut();
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        for point in points {
            if point.vector.len() != collection.params.size {
                return Err(Error::Store {
                    status: 400,
                    body: format!(
                        "wrong vector dimension: expected {}, got {}",
                        collection.params.size,
                        point.vector.len()
                    ),
                });
            }
        }
        for point in points {
            collection.points.insert(point.id, point.clone());
        }
        Ok(())
    }

    fn search(&self, name: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
        let collections = self.collections.borrow();
        let collection = collections
            .get(name)
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))?;
        let distance = collection.params.distance;

        let mut hits: Vec<ScoredPoint> = collection
            .points
            .values()
            .map(|p| ScoredPoint {
                id: PointId::Num(p.id),
                score: score(distance, vector, &p.vector),
                payload: Some(p.payload.clone()),
            })
            .collect();

        // Euclid scores are distances, so smaller is closer.
        hits.sort_by(|a, b| match distance {
            Distance::Euclid => a.score.total_cmp(&b.score),
            Distance::Cosine | Distance::Dot => b.score.total_cmp(&a.score),
        });
        hits.truncate(limit as usize);
        Ok(hits)
    }

    fn delete_collection(&self, name: &str) -> Result<()> {
        self.collections.borrow_mut().remove(name);
        Ok(())
    }
}

fn score(distance: Distance, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match distance {
        Distance::Dot => dot,
        Distance::Cosine => {
            let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                0.0
            } else {
                dot / (norm_a * norm_b)
            }
        }
        Distance::Euclid => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}
