use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentence embedding models the loader knows how to run locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingModelKind {
    AllMiniLmL6V2,
    BgeSmallEnV15,
}

impl EmbeddingModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingModelKind::AllMiniLmL6V2 => "all-minilm-l6-v2",
            EmbeddingModelKind::BgeSmallEnV15 => "bge-small-en-v15",
        }
    }
}

impl FromStr for EmbeddingModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all-minilm-l6-v2" | "all-minilm-l6" | "minilm" => Ok(Self::AllMiniLmL6V2),
            "bge-small-en-v15" | "bge-small-en-v1.5" | "bge-small" => Ok(Self::BgeSmallEnV15),
            other => Err(format!("unknown embedding model \"{other}\"")),
        }
    }
}

impl Serialize for EmbeddingModelKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EmbeddingModelKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ModelVisitor;

        impl<'de> Visitor<'de> for ModelVisitor {
            type Value = EmbeddingModelKind;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("\"all-minilm-l6-v2\" or \"bge-small-en-v15\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<EmbeddingModelKind, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(ModelVisitor)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine command line, e.g. `docker`, `podman` or `sudo docker`.
    pub engine: String,
    pub image: String,
    pub local_port: u16,
    pub remote_port: u16,
    pub store_url: String,
    pub api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub startup_wait_secs: u64,
    pub collection: String,
    pub data_path: PathBuf,
    pub text_column: String,
    pub embedding_model: EmbeddingModelKind,
    pub model_cache_dir: Option<PathBuf>,
    pub embed_batch_size: usize,
    /// Points per upsert request when loading a collection.
    pub upload_batch_size: usize,
    pub search_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: "docker".to_string(),
            image: "qdrant/qdrant".to_string(),
            local_port: 6333,
            remote_port: 6333,
            store_url: "http://localhost:6333".to_string(),
            api_key: None,
            http_timeout_secs: 120,
            startup_wait_secs: 15,
            collection: "books".to_string(),
            data_path: PathBuf::from("./data/datasets/books_clean.csv"),
            text_column: "combined_column".to_string(),
            embedding_model: EmbeddingModelKind::AllMiniLmL6V2,
            model_cache_dir: None,
            embed_batch_size: 64,
            upload_batch_size: 256,
            search_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_accepts_aliases() {
        assert_eq!(
            "MiniLM".parse::<EmbeddingModelKind>(),
            Ok(EmbeddingModelKind::AllMiniLmL6V2)
        );
        assert_eq!(
            "bge-small-en-v1.5".parse::<EmbeddingModelKind>(),
            Ok(EmbeddingModelKind::BgeSmallEnV15)
        );
        assert!("word2vec".parse::<EmbeddingModelKind>().is_err());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: Config = serde_yaml::from_str("collection: novels\nlocal_port: 7333\n").unwrap();
        assert_eq!(cfg.collection, "novels");
        assert_eq!(cfg.local_port, 7333);
        assert_eq!(cfg.remote_port, 6333);
        assert_eq!(cfg.image, "qdrant/qdrant");
        assert_eq!(cfg.embedding_model, EmbeddingModelKind::AllMiniLmL6V2);
    }

    #[test]
    fn model_kind_from_yaml() {
        let cfg: Config = serde_yaml::from_str("embedding_model: bge-small\n").unwrap();
        assert_eq!(cfg.embedding_model, EmbeddingModelKind::BgeSmallEnV15);

        let bad = serde_yaml::from_str::<Config>("embedding_model: 42\n");
        assert!(bad.is_err());
    }
}
