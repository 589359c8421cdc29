//! Blocking REST client for a Qdrant service.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::error::{Error, Result};

use super::VectorStore;
use super::types::{CollectionInfo, Point, ScoredPoint, VectorParams};

/// Qdrant wraps every response body as `{"result": ..., "status": ...}`.
#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionList {
    collections: Vec<CollectionName>,
}

#[derive(Deserialize)]
struct CollectionName {
    name: String,
}

/// Points per upsert request unless overridden with
/// [`QdrantStore::with_upload_chunk`]. The service rejects bodies over 32 MiB
/// by default; 256 points of 384 floats plus a description stay near 1.5 MiB.
pub const DEFAULT_UPLOAD_CHUNK: usize = 256;

/// HTTP client for a single Qdrant endpoint.
pub struct QdrantStore {
    base_url: String,
    api_key: Option<String>,
    upload_chunk: usize,
    client: Client,
}

impl QdrantStore {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("shelfload/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            upload_chunk: DEFAULT_UPLOAD_CHUNK,
            client,
        })
    }

    pub fn with_upload_chunk(mut self, points: usize) -> Self {
        self.upload_chunk = points.max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match &self.api_key {
            Some(key) => request.header("api-key", key),
            None => request,
        };
        let response = request.send()?;
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Err(Error::Store { status, body })
    }

    fn result<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let envelope: Envelope<T> = self.send(request)?.json()?;
        Ok(envelope.result)
    }
}

impl VectorStore for QdrantStore {
    fn list_collections(&self) -> Result<Vec<String>> {
        debug!("listing collections");
        let list: CollectionList = self.result(self.client.get(self.url("/collections")))?;
        Ok(list.collections.into_iter().map(|c| c.name).collect())
    }

    fn collection_info(&self, name: &str) -> Result<CollectionInfo> {
        debug!(collection = name, "fetching collection info");
        let request = self.client.get(self.url(&format!("/collections/{name}")));
        match self.result(request) {
            Err(Error::Store { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(Error::CollectionNotFound(name.to_string()))
            }
            other => other,
        }
    }

    fn create_collection(&self, name: &str, params: VectorParams) -> Result<()> {
        debug!(collection = name, ?params, "creating collection");
        let body = json!({ "vectors": params });
        let _: bool = self.result(
            self.client
                .put(self.url(&format!("/collections/{name}")))
                .json(&body),
        )?;
        Ok(())
    }

    fn upload_points(&self, name: &str, points: &[Point]) -> Result<()> {
        let url = self.url(&format!("/collections/{name}/points?wait=true"));
        for (chunk, batch) in points.chunks(self.upload_chunk).enumerate() {
            debug!(collection = name, chunk, count = batch.len(), "uploading points");
            let body = json!({ "points": batch });
            let _: serde_json::Value = self.result(self.client.put(&url).json(&body))?;
        }
        Ok(())
    }

    fn search(&self, name: &str, vector: &[f32], limit: u64) -> Result<Vec<ScoredPoint>> {
        debug!(collection = name, limit, "searching");
        let body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });
        let request = self
            .client
            .post(self.url(&format!("/collections/{name}/points/search")))
            .json(&body);
        match self.result(request) {
            Err(Error::Store { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(Error::CollectionNotFound(name.to_string()))
            }
            other => other,
        }
    }

    fn delete_collection(&self, name: &str) -> Result<()> {
        debug!(collection = name, "deleting collection");
        let _: bool =
            self.result(self.client.delete(self.url(&format!("/collections/{name}"))))?;
        Ok(())
    }
}
