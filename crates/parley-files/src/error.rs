use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use parley_core::HttpError;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the file endpoints
#[derive(Debug, Error)]
pub enum FileError {
    /// Malformed upload form or identifier
    #[error("{0}")]
    Validation(String),

    /// Upload exceeds the configured size limit
    #[error("file exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Unexpected failure; details are logged, not returned
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError for FileError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Storage(StorageError::InvalidId(_)) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::Io(_)) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Storage(StorageError::Io(_)) => "failed to store file".to_owned(),
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for FileError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();

        if envelope.status >= 500 {
            tracing::error!(error = %self, "file request failed");
        }

        (envelope.status_code(), Json(envelope)).into_response()
    }
}
