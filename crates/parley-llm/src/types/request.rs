use parley_files::Attachment;
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::error::LlmError;

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_TOP_P: f64 = 1.0;

/// Chat completion request as sent by the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier; empty means the configured default model
    #[serde(default)]
    pub model: String,
    /// Conversation, oldest first
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Nucleus sampling threshold (0.0 to 1.0)
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stream: bool,
    /// Caller-supplied system prompt
    #[serde(default, alias = "systemPrompt", skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Random seed for deterministic generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Parsed files whose text is folded into the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

impl CompletionRequest {
    /// Request with default sampling parameters
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: String::new(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: None,
            stream: false,
            system: None,
            seed: None,
            attachments: None,
        }
    }

    /// Check parameter bounds before anything is sent upstream
    pub fn validate(&self) -> Result<(), LlmError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(LlmError::Validation(format!(
                "temperature must be between 0 and 2, got {}",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(LlmError::Validation(format!(
                "top_p must be between 0 and 1, got {}",
                self.top_p
            )));
        }

        if self.max_tokens == Some(0) {
            return Err(LlmError::Validation("max_tokens must be at least 1".to_owned()));
        }

        Ok(())
    }

    /// Fill in the model when the client left it out
    pub fn apply_default_model(&mut self, default_model: &str) {
        if self.model.trim().is_empty() {
            default_model.clone_into(&mut self.model);
        }
    }
}

const fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

const fn default_top_p() -> f64 {
    DEFAULT_TOP_P
}
