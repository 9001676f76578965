use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use parley_core::HttpError;
use thiserror::Error;

/// Errors that can occur while proxying a completion
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client sent a malformed or out-of-range request
    #[error("invalid request: {0}")]
    Validation(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    UpstreamHttp { status: StatusCode, body: String },

    /// Upstream could not be reached or the connection broke
    #[error("upstream request failed: {0}")]
    UpstreamTransport(String),
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamHttp { status, .. } => *status,
            Self::UpstreamTransport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn detail(&self) -> String {
        match self {
            // upstream body verbatim
            Self::UpstreamHttp { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for LlmError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();

        if let Self::Validation(_) = &self {
            tracing::debug!(error = %self, "rejected completion request");
        }

        (envelope.status_code(), Json(envelope)).into_response()
    }
}
