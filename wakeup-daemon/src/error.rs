use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use wakeup_core::{InvalidInterval, ResourceId, StoreError};

/// Error surface for the daemon runtime.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("{task} task failed: {message}")]
    Task { task: &'static str, message: String },
}

/// Failures of a registry operation, mapped onto HTTP status codes by the
/// router.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    #[error(transparent)]
    InvalidInterval(#[from] InvalidInterval),

    #[error("resource already exists: {0}")]
    Duplicate(String),

    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// The in-memory document already holds the change; only persistence failed.
    #[error("failed to persist document: {0}")]
    Store(#[from] StoreError),
}

/// Everything an HTTP handler can answer with besides success.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Registry(err) => match err {
                RegistryError::InvalidUrl(_) | RegistryError::InvalidInterval(_) => {
                    StatusCode::BAD_REQUEST
                }
                RegistryError::Duplicate(_) => StatusCode::CONFLICT,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
