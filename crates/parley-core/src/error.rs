use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Trait for domain errors that can be converted to HTTP responses
///
/// Implemented by each feature crate's error type. The feature crates turn
/// these into axum responses through [`ErrorEnvelope`], keeping the domain
/// errors themselves free of any web framework types.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Human-readable detail safe to expose to API consumers
    fn detail(&self) -> String;

    /// Render the error as the client-facing envelope
    fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope::new(self.status_code(), self.detail())
    }
}

/// Error body returned by every non-streaming endpoint: `{"status", "detail"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Numeric HTTP status
    pub status: u16,
    /// Failure description
    pub detail: String,
}

impl ErrorEnvelope {
    /// Build an envelope from a status code and detail text
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    /// Status as a typed code, falling back to 500 for out-of-range values
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
