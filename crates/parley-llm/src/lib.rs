//! Completion proxy for Parley
//!
//! Forwards chat requests to one OpenAI-compatible API. Attachment text is
//! folded into a leading system message, and streamed responses are reduced
//! to a small client-facing event protocol.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod context;
pub mod error;
mod handler;
pub mod payload;
pub mod protocol;
pub mod proxy;
pub mod stream;
pub mod types;

use std::sync::Arc;

use parley_config::UpstreamConfig;

pub use context::build_context;
pub use error::LlmError;
pub use handler::endpoint_router;
pub use payload::UpstreamPayload;
pub use proxy::UpstreamClient;
pub use stream::{LineDecoder, Normalizer, StreamState};
pub use types::{ChatMessage, CompletionRequest, NormalizedEvent, Role};

/// Build the upstream client from configuration, sharing `client`'s connection pool
pub fn build_client(client: reqwest::Client, config: &UpstreamConfig) -> Arc<UpstreamClient> {
    tracing::debug!(base_url = %config.base_url, default_model = %config.default_model, "upstream configured");

    Arc::new(UpstreamClient::new(client, config))
}
