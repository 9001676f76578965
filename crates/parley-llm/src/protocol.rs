//! Upstream streaming chunk format
//!
//! Parsed leniently: every field is optional so partial or provider-specific
//! chunks still yield whatever text and finish reason they carry.

use serde::Deserialize;

/// One `data:` payload of an `OpenAI`-style completion stream
#[derive(Debug, Default, Deserialize)]
pub struct UpstreamChunk {
    #[serde(default)]
    pub choices: Option<Vec<ChunkChoice>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl UpstreamChunk {
    fn first_choice(&self) -> Option<&ChunkChoice> {
        self.choices.as_deref()?.first()
    }

    /// Incremental text of the first choice, if any
    pub fn content(&self) -> Option<&str> {
        self.first_choice()?.delta.as_ref()?.content.as_deref()
    }

    /// Finish reason of the first choice, if any
    pub fn finish_reason(&self) -> Option<&str> {
        self.first_choice()?.finish_reason.as_deref()
    }
}
