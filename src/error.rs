use std::path::PathBuf;

/// Failures of the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file exists but is not a valid document list.
    #[error("store file {path} is corrupt: {source}")]
    Corruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize documents: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures reported by the search orchestrator before any I/O happens.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no query given")]
    EmptyQuery,
}

/// Failures inside a web backend. These never leave the backend as errors;
/// they are turned into error sentinel documents.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {target} failed: {source}")]
    Request {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{target} answered with status {status}")]
    Status {
        target: String,
        status: reqwest::StatusCode,
    },

    #[error("no search sites configured")]
    NoSites,
}
