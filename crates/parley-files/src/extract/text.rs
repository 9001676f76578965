use std::path::Path;

use serde_json::Value;

use super::{ExtractedText, ExtractionError, TextBudget};
use crate::attachment::Metadata;

pub(super) fn extract(path: &Path, _name: &str, max_chars: usize) -> Result<ExtractedText, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let decoded: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();

    let admitted = TextBudget::new(max_chars).admit(&decoded, 0);

    let mut metadata = Metadata::new();
    metadata.insert("encoding".to_owned(), Value::from("utf-8"));

    Ok(ExtractedText {
        text: admitted.text().to_owned(),
        metadata,
        truncated: admitted.is_clipped(),
    })
}
