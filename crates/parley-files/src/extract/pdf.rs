use std::path::Path;

use lopdf::{Document, Object};
use serde_json::Value;

use super::{ExtractedText, ExtractionError, FileKind, TextBudget};
use crate::attachment::Metadata;

pub(super) fn extract(path: &Path, _name: &str, max_chars: usize) -> Result<ExtractedText, ExtractionError> {
    let document = Document::load(path).map_err(|e| ExtractionError::parse(FileKind::Pdf, e))?;
    let pages = document.get_pages();

    let mut budget = TextBudget::new(max_chars);
    let mut blocks = Vec::new();

    for &number in pages.keys() {
        let page_text = document
            .extract_text(&[number])
            .map_err(|e| ExtractionError::parse(FileKind::Pdf, e))?;

        let admitted = budget.admit(&page_text, 0);
        if admitted.is_clipped() && admitted.text().is_empty() {
            break;
        }

        blocks.push(format!("[Page {number}]\n{}", admitted.text()));

        if budget.is_exhausted() {
            break;
        }
    }

    let mut metadata = Metadata::new();
    metadata.insert("pages".to_owned(), Value::from(pages.len()));
    metadata.insert("extracted_pages".to_owned(), Value::from(blocks.len()));

    for (key, field) in [("title", b"Title".as_slice()), ("author", b"Author".as_slice())] {
        if let Some(value) = info_string(&document, field).filter(|v| !v.is_empty()) {
            metadata.insert(key.to_owned(), Value::from(value));
        }
    }

    Ok(ExtractedText {
        text: blocks.join("\n\n"),
        metadata,
        truncated: budget.is_exhausted(),
    })
}

/// Read a string entry from the document information dictionary
fn info_string(document: &Document, key: &[u8]) -> Option<String> {
    let info = match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?,
        object => object,
    };

    match info.as_dict().ok()?.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE when it carries a byte order mark, Latin-1 otherwise
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| char::from(b)).collect()
}
