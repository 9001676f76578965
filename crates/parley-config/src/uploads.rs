use std::path::PathBuf;

use serde::Deserialize;

/// Default bound on extracted text, in characters
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 50_000;

/// Default bound on a single uploaded file (20 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 << 20;

/// Attachment storage and extraction limits
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadsConfig {
    /// Root directory attachments are stored under
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Largest accepted upload body for one file
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Characters of text kept per extracted file
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("uploads")
}

const fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

const fn default_max_text_length() -> usize {
    DEFAULT_MAX_TEXT_LENGTH
}
