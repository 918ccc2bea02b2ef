//! Errors shared by the mining, lookup, storage and print-ordering stages.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A dictionary could not be loaded, or none were configured at all.
    #[error("dictionary '{name}' unavailable at {}: {reason}", path.display())]
    DictionaryUnavailable {
        name: String,
        path: PathBuf,
        reason: String,
    },

    #[error("{service} lookup failed for '{word}': {reason}")]
    Lookup {
        service: &'static str,
        word: String,
        reason: String,
    },

    #[error("{service} lookup for '{word}' timed out")]
    Timeout { service: &'static str, word: String },

    #[error("document has no pages to reorder")]
    EmptyDocument,

    #[error("page index {index} out of range for a {count}-page document")]
    PageOutOfRange { index: usize, count: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to extract text from {}: {reason}", path.display())]
    Extract { path: PathBuf, reason: String },

    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Per-word problems that should be papered over rather than abort a batch.
    pub fn is_data_quality(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}
