//! Error types for wakeup-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from document persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, annotated with the path being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parse error on load, with the document path.
    #[error("failed to parse document at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A ping interval outside the supported `[1, 60]` minute range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid ping interval {0} (must be between 1 and 60)")]
pub struct InvalidInterval(pub i64);

/// Convenience constructor for [`StoreError::Io`].
pub fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
