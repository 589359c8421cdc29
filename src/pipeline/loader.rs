use tracing::{error, info};

use crate::dataset::Table;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::store::{Distance, Point, VectorParams, VectorStore, collection_exists, collection_populated};

use super::types::{LoadOutcome, LoadRequest};

/// Fill `request.collection` from its data file unless it already holds
/// records.
///
/// An absent collection and an existing empty one both get loaded; only the
/// absent one is created first. The embedder is built only when a load is
/// actually needed. Failures of the readiness checks are returned as errors;
/// failures during create/read/embed/upload are logged and folded into
/// [`LoadOutcome::Failed`].
///
/// The check-then-load sequence is not atomic: two concurrent runs against
/// the same fresh collection can both load it.
pub fn load_if_absent<F>(
    store: &dyn VectorStore,
    request: &LoadRequest,
    make_embedder: F,
) -> Result<LoadOutcome>
where
    F: FnOnce() -> Result<Box<dyn Embedder>>,
{
    let name = &request.collection;
    let exists = collection_exists(store, name)?;
    if exists && collection_populated(store, name)? {
        info!(collection = %name, "collection already present");
        return Ok(LoadOutcome::AlreadyPresent);
    }

    match bulk_load(store, request, exists, make_embedder) {
        Ok(records) => {
            info!(collection = %name, records, "data inserted");
            Ok(LoadOutcome::Loaded {
                created: !exists,
                records,
            })
        }
        Err(e) => {
            error!(collection = %name, error = %e, "an error occurred while inserting data");
            Ok(LoadOutcome::Failed {
                reason: e.to_string(),
            })
        }
    }
}

fn bulk_load<F>(
    store: &dyn VectorStore,
    request: &LoadRequest,
    exists: bool,
    make_embedder: F,
) -> Result<usize>
where
    F: FnOnce() -> Result<Box<dyn Embedder>>,
{
    let embedder = make_embedder()?;
    if !exists {
        store.create_collection(
            &request.collection,
            VectorParams {
                size: embedder.dimension(),
                distance: Distance::Cosine,
            },
        )?;
    }

    let table = Table::read(&request.data_path)?;
    let points = build_points(&table, &request.text_column, embedder.as_ref())?;
    if !points.is_empty() {
        store.upload_points(&request.collection, &points)?;
    }
    Ok(points.len())
}

/// One point per row: id is the zero-based row position, the vector embeds
/// `text_column`, and the payload carries every column.
pub fn build_points(table: &Table, text_column: &str, embedder: &dyn Embedder) -> Result<Vec<Point>> {
    let texts = table.column(text_column)?;
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = embedder.encode(&texts)?;
    if vectors.len() != texts.len() {
        return Err(Error::Embedding(format!(
            "expected {} vectors, got {}",
            texts.len(),
            vectors.len()
        )));
    }
    let dimension = embedder.dimension();
    if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
        return Err(Error::Embedding(format!(
            "expected {dimension}-dimensional vectors, got {}",
            bad.len()
        )));
    }

    Ok(vectors
        .into_iter()
        .enumerate()
        .map(|(idx, vector)| Point {
            id: idx as u64,
            vector,
            payload: table.payload(idx),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use super::*;
    use crate::store::MemoryStore;

    /// Deterministic embedder: vector of letter frequencies over a..d.
    struct LetterEmbedder;

    impl Embedder for LetterEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    let mut v = vec![0.0; 4];
                    for c in t.chars() {
                        if let Some(i) = "abcd".find(c) {
                            v[i] += 1.0;
                        }
                    }
                    v
                })
                .collect())
        }
    }

    fn letters() -> Result<Box<dyn Embedder>> {
        Ok(Box::new(LetterEmbedder))
    }

    fn write_csv(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("books_clean.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn request(path: PathBuf, column: &str) -> LoadRequest {
        LoadRequest {
            collection: "books".into(),
            data_path: path,
            text_column: column.into(),
        }
    }

    #[test]
    fn absent_collection_is_created_and_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "text,year\nabc,1990\nbad,2001\ncab,\n");
        let store = MemoryStore::new();

        let outcome = load_if_absent(&store, &request(path, "text"), letters).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                created: true,
                records: 3
            }
        );
        assert_eq!(
            store.params("books"),
            Some(VectorParams {
                size: 4,
                distance: Distance::Cosine
            })
        );
        assert_eq!(store.upload_calls(), 1);

        let points = store.points("books");
        let ids: Vec<u64> = points.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(points[1].payload["text"], "bad");
        assert_eq!(points[1].payload["year"], "2001");
        assert!(points[2].payload["year"].is_null());
        assert_eq!(points[0].vector, vec![1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn populated_collection_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "text\nabc\n");
        let store = MemoryStore::new();
        load_if_absent(&store, &request(path.clone(), "text"), letters).unwrap();
        let (creates, uploads) = (store.create_calls(), store.upload_calls());

        let built = Rc::new(Cell::new(false));
        let flag = built.clone();
        let outcome = load_if_absent(&store, &request(path, "text"), move || {
            flag.set(true);
            letters()
        })
        .unwrap();

        assert_eq!(outcome, LoadOutcome::AlreadyPresent);
        assert_eq!(store.create_calls(), creates);
        assert_eq!(store.upload_calls(), uploads);
        assert!(!built.get(), "embedder must not be built for a no-op");
    }

    #[test]
    fn empty_existing_collection_is_loaded_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "text\nabc\nddd\n");
        let store = MemoryStore::new();
        store
            .create_collection(
                "books",
                VectorParams {
                    size: 4,
                    distance: Distance::Cosine,
                },
            )
            .unwrap();

        let outcome = load_if_absent(&store, &request(path, "text"), letters).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                created: false,
                records: 2
            }
        );
        assert_eq!(store.create_calls(), 1);
    }

    #[test]
    fn embeds_named_column_not_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "isbn,text\nddd,aaa\n");
        let store = MemoryStore::new();
        load_if_absent(&store, &request(path, "text"), letters).unwrap();
        assert_eq!(store.points("books")[0].vector, vec![3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_file_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let outcome = load_if_absent(
            &store,
            &request(dir.path().join("absent.csv"), "text"),
            letters,
        )
        .unwrap();
        assert!(matches!(outcome, LoadOutcome::Failed { .. }));
        // Creation precedes the read, so the empty collection remains and
        // the next run will load it.
        assert!(collection_exists(&store, "books").unwrap());
        assert_eq!(store.upload_calls(), 0);
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "title\nabc\n");
        let store = MemoryStore::new();
        match load_if_absent(&store, &request(path, "combined_column"), letters).unwrap() {
            LoadOutcome::Failed { reason } => assert!(reason.contains("combined_column")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn embedder_load_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "text\nabc\n");
        let store = MemoryStore::new();
        let outcome = load_if_absent(&store, &request(path, "text"), || {
            Err(Error::Embedding("model download failed".into()))
        })
        .unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Failed {
                reason: "embedding error: model download failed".into()
            }
        );
        assert_eq!(store.create_calls(), 0);
    }

    #[test]
    fn header_only_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "text\n");
        let store = MemoryStore::new();
        let outcome = load_if_absent(&store, &request(path, "text"), letters).unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                created: true,
                records: 0
            }
        );
        assert_eq!(store.upload_calls(), 0);
    }

    struct ShortEmbedder;

    impl Embedder for ShortEmbedder {
        fn dimension(&self) -> usize {
            4
        }

        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0]).collect())
        }
    }

    #[test]
    fn build_points_rejects_wrong_dimension() {
        let table = Table::from_reader("t.csv", "text\nabc\n".as_bytes()).unwrap();
        let err = build_points(&table, "text", &ShortEmbedder).unwrap_err();
        assert!(matches!(err, Error::Embedding(_)));
    }
}
