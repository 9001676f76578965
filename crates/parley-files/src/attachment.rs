use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::Extraction;

/// Format-specific key/value pairs recorded during extraction
pub type Metadata = BTreeMap<String, Value>;

/// A processed upload, as returned to the client and echoed back with chat requests
///
/// At most one of `text_content` and `parse_error` is set. `truncated` means
/// `text_content` was cut at the extraction bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub media_type: String,
    pub size_bytes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    #[serde(default)]
    pub truncated: bool,
}

impl Attachment {
    /// Build the attachment record for a stored file from its extraction outcome
    pub fn from_extraction(id: String, name: String, size_bytes: u64, extraction: Extraction) -> Self {
        let Extraction {
            media_type, outcome, ..
        } = extraction;

        match outcome {
            Ok(extracted) => Self {
                id,
                name,
                media_type,
                size_bytes,
                text_content: Some(extracted.text),
                metadata: Some(extracted.metadata),
                parse_error: None,
                truncated: extracted.truncated,
            },
            Err(e) => Self {
                id,
                name,
                media_type,
                size_bytes,
                text_content: None,
                metadata: None,
                parse_error: Some(e.to_string()),
                truncated: false,
            },
        }
    }

    /// Whether this attachment contributes text to the prompt
    pub fn is_usable(&self) -> bool {
        self.parse_error.is_none() && self.text_content.as_deref().is_some_and(|text| !text.is_empty())
    }
}
