use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::Result;

use super::VectorStore;

/// Exact-name membership in the store's collection list.
pub fn collection_exists(store: &dyn VectorStore, name: &str) -> Result<bool> {
    Ok(store.list_collections()?.iter().any(|c| c == name))
}

/// Whether the collection holds at least one record.
///
/// Fails with [`Error::CollectionNotFound`](crate::Error::CollectionNotFound)
/// for an unknown collection; check [`collection_exists`] first.
pub fn collection_populated(store: &dyn VectorStore, name: &str) -> Result<bool> {
    Ok(store.collection_info(name)?.record_count() > 0)
}

/// Poll the store until it answers a collection listing or `timeout` passes.
///
/// Returns whether the service became reachable.
pub fn wait_for_service(store: &dyn VectorStore, timeout: Duration, interval: Duration) -> bool {
    let start = Instant::now();
    loop {
        match store.list_collections() {
            Ok(_) => return true,
            Err(e) => debug!(error = %e, "vector store not ready yet"),
        }
        if start.elapsed() + interval > timeout {
            return false;
        }
        std::thread::sleep(interval);
    }
}
