//! Outbound request body for `POST {base_url}/chat/completions`

use serde::Serialize;

use crate::context::build_context;
use crate::types::{ChatMessage, CompletionRequest};

/// `OpenAI` chat completion request as sent upstream
///
/// Streaming and non-streaming calls share this one shape; only `stream` differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub stream: bool,
}

impl UpstreamPayload {
    /// Assemble the upstream request from a validated client request
    ///
    /// The attachment context block and the caller's system prompt are merged
    /// into one leading system message, context first.
    pub fn build(request: &CompletionRequest) -> Self {
        let context = request.attachments.as_deref().map(build_context).unwrap_or_default();
        let system = request.system.as_deref().filter(|s| !s.is_empty());

        let system_content = match (context.is_empty(), system) {
            (false, Some(system)) => Some(format!("{context}\n\n{system}")),
            (false, None) => Some(context),
            (true, Some(system)) => Some(system.to_owned()),
            (true, None) => None,
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.extend(system_content.map(ChatMessage::system));
        messages.extend(request.messages.iter().cloned());

        Self {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
            seed: request.seed,
            stream: request.stream,
        }
    }
}
