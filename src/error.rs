//! Error types shared by every stage of the loader.

use thiserror::Error;

/// Main error type for shelfload operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The container engine is missing or its daemon is unreachable.
    #[error("{0}")]
    RuntimeUnavailable(String),

    /// The engine binary could not be launched at all.
    #[error("failed to invoke `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An engine subcommand ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Pulling an image failed or produced nothing usable.
    #[error("failed to pull image '{image}': {reason}")]
    PullFailed { image: String, reason: String },

    /// No container instance exists for a locally present image.
    #[error("no container found for image '{0}'")]
    NoContainer(String),

    /// The vector store has no collection by this name.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Transport-level failure talking to the vector store.
    #[error("vector store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vector store answered with a non-success status.
    #[error("vector store returned {status}: {body}")]
    Store { status: u16, body: String },

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Embedding model failed to load or encode.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// The data source lacks the requested column.
    #[error("column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Fatal errors stop the whole run; everything else is reported and the
    /// orchestrator decides whether to continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::RuntimeUnavailable(_) | Self::CollectionNotFound(_) | Self::Config(_)
        )
    }
}

/// Result type alias for shelfload operations.
pub type Result<T> = std::result::Result<T, Error>;
