use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use zip::ZipArchive;
use zip::result::ZipError;

use super::{ExtractedText, ExtractionError, FileKind, TextBudget};
use crate::attachment::Metadata;

const DOCUMENT_PART: &str = "word/document.xml";
const CORE_PROPERTIES_PART: &str = "docProps/core.xml";

// -- Patterns over WordprocessingML, compiled once --

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p(?:\s[^>]*?)?(?:/>|>(.*?)</w:p>)").expect("paragraph pattern"));

static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|<w:tab\s*/>|<w:br(?:\s[^>]*)?/>|<w:cr\s*/>").expect("run pattern")
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(amp|lt|gt|quot|apos|#[0-9]+|#x[0-9a-fA-F]+);").expect("entity pattern"));

pub(super) fn extract(path: &Path, _name: &str, max_chars: usize) -> Result<ExtractedText, ExtractionError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| ExtractionError::parse(FileKind::Word, e))?;

    let document = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| ExtractionError::parse(FileKind::Word, format!("missing {DOCUMENT_PART}")))?;

    let paragraphs = paragraphs(&document);

    let mut budget = TextBudget::new(max_chars);
    let mut kept = Vec::new();

    for paragraph in &paragraphs {
        let admitted = budget.admit(paragraph, 1);
        if admitted.is_clipped() && admitted.text().is_empty() {
            break;
        }

        kept.push(admitted.text());

        if budget.is_exhausted() {
            break;
        }
    }

    let mut metadata = Metadata::new();
    metadata.insert("paragraphs".to_owned(), Value::from(paragraphs.len()));
    metadata.insert("extracted_paragraphs".to_owned(), Value::from(kept.len()));

    if let Some(core) = read_part(&mut archive, CORE_PROPERTIES_PART)? {
        for (key, element) in [("title", "dc:title"), ("author", "dc:creator")] {
            if let Some(value) = element_text(&core, element).filter(|v| !v.is_empty()) {
                metadata.insert(key.to_owned(), Value::from(value));
            }
        }
    }

    Ok(ExtractedText {
        text: kept.join("\n"),
        metadata,
        truncated: budget.is_exhausted(),
    })
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> Result<Option<String>, ExtractionError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ExtractionError::parse(FileKind::Word, e)),
    };

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::parse(FileKind::Word, e))?;

    Ok(Some(xml))
}

/// Visible text of every paragraph, in document order
fn paragraphs(document: &str) -> Vec<String> {
    PARAGRAPH_RE
        .captures_iter(document)
        .map(|paragraph| {
            let body = paragraph.get(1).map_or("", |m| m.as_str());
            let mut text = String::new();

            for run in RUN_RE.captures_iter(body) {
                match run.get(1) {
                    Some(content) => text.push_str(&decode_entities(content.as_str())),
                    None if run[0].starts_with("<w:tab") => text.push('\t'),
                    None => text.push('\n'),
                }
            }

            text
        })
        .collect()
}

fn element_text(xml: &str, element: &str) -> Option<String> {
    let open = format!("<{element}");
    let start = xml.find(&open)?;
    let after_open = start + xml[start..].find('>')? + 1;

    // self-closing element carries no text
    if xml[..after_open].ends_with("/>") {
        return None;
    }

    let close = format!("</{element}>");
    let end = after_open + xml[after_open..].find(&close)?;

    Some(decode_entities(xml[after_open..end].trim()).into_owned())
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_RE.replace_all(text, |captures: &Captures<'_>| match &captures[1] {
        "amp" => "&".to_owned(),
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "quot" => "\"".to_owned(),
        "apos" => "'".to_owned(),
        numeric => numeric_reference(numeric).map_or_else(|| captures[0].to_owned(), String::from),
    })
}

fn numeric_reference(reference: &str) -> Option<char> {
    let digits = reference.strip_prefix('#')?;
    let code = match digits.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };

    char::from_u32(code)
}
