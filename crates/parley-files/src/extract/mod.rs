//! Bounded text extraction from uploaded files
//!
//! The media type is resolved once (magic numbers first, then the declared
//! file name's extension, then a plain-text check) into a [`FileKind`], which selects one extractor
//! from a fixed table. Every extractor honours the same character budget.

mod budget;
#[cfg(test)]
mod fixtures;
mod image;
mod pdf;
mod text;
mod word;

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use thiserror::Error;

use crate::attachment::Metadata;

pub(crate) use budget::TextBudget;

/// Media type used when nothing else can be determined
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Word 2007+ document media type
pub const DOCX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Legacy Word document media type
pub const DOC_MEDIA_TYPE: &str = "application/msword";

/// Media type for content that reads as text but has no recognised name
const PLAIN_TEXT: &str = "text/plain";

/// Leading bytes inspected when deciding whether unrecognised content is text
const TEXT_SNIFF_BYTES: u64 = 8 << 10;

/// Extension fallback used when content sniffing finds nothing
const EXTENSION_TABLE: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("pdf", "application/pdf"),
    ("docx", DOCX_MEDIA_TYPE),
    ("doc", DOC_MEDIA_TYPE),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

/// Extractor family a media type dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Text,
    Pdf,
    Word,
    Image,
    Unsupported,
}

impl FileKind {
    /// Classify a media type
    pub fn from_media_type(media_type: &str) -> Self {
        match media_type {
            m if m.starts_with("text/") => Self::Text,
            "application/pdf" => Self::Pdf,
            DOCX_MEDIA_TYPE | DOC_MEDIA_TYPE => Self::Word,
            m if m.starts_with("image/") => Self::Image,
            _ => Self::Unsupported,
        }
    }

    fn extractor(self) -> Option<Extractor> {
        match self {
            Self::Text => Some(text::extract),
            Self::Pdf => Some(pdf::extract),
            Self::Word => Some(word::extract),
            Self::Image => Some(image::extract),
            Self::Unsupported => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Image => "image",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Signature shared by every extractor: file path, display name, character budget
type Extractor = fn(&Path, &str, usize) -> Result<ExtractedText, ExtractionError>;

/// Text and metadata pulled out of a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    /// Extracted text, at most the budget in characters (plus structural labels)
    pub text: String,
    /// Format-specific metadata (page counts, title, author, EXIF fields)
    pub metadata: Metadata,
    /// Whether extraction stopped because the budget ran out
    pub truncated: bool,
}

/// Why a file produced no text
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// No extractor exists for the media type
    #[error("Unsupported file type: {media_type}")]
    UnsupportedType { media_type: String },

    /// The file could not be read
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The file was read but its contents could not be parsed
    #[error("failed to parse {kind} file: {message}")]
    Parse { kind: FileKind, message: String },
}

impl ExtractionError {
    pub(crate) fn parse(kind: FileKind, error: impl fmt::Display) -> Self {
        Self::Parse {
            kind,
            message: error.to_string(),
        }
    }
}

/// Outcome of running the extractor pipeline over one file
#[derive(Debug)]
pub struct Extraction {
    /// Detected media type
    pub media_type: String,
    /// Extractor family the media type resolved to
    pub kind: FileKind,
    /// Extracted text, or the reason there is none
    pub outcome: Result<ExtractedText, ExtractionError>,
}

/// Media type and extractor family of a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedType {
    pub media_type: String,
    pub kind: FileKind,
}

/// Resolve the media type of a stored file and the extractor it dispatches to
pub fn detect(path: &Path, declared_name: &str) -> DetectedType {
    let media_type = detect_media_type(path, declared_name);
    let kind = FileKind::from_media_type(&media_type);

    DetectedType { media_type, kind }
}

/// Detect the media type of a stored file
///
/// Magic numbers win; the declared name's extension is consulted only when
/// sniffing recognises nothing. Content neither recognises is `text/plain`
/// when its leading bytes are UTF-8 without NULs.
pub fn detect_media_type(path: &Path, declared_name: &str) -> String {
    let sniffed = match infer::get_from_path(path) {
        Ok(found) => found.map(|kind| kind.mime_type().to_owned()),
        Err(e) => {
            tracing::debug!(error = %e, "content sniffing failed, falling back to extension");
            None
        }
    };

    sniffed
        .or_else(|| media_type_from_name(declared_name).map(str::to_owned))
        .unwrap_or_else(|| match looks_like_text(path) {
            Ok(true) => PLAIN_TEXT.to_owned(),
            Ok(false) => OCTET_STREAM.to_owned(),
            Err(e) => {
                tracing::debug!(error = %e, "text check failed");
                OCTET_STREAM.to_owned()
            }
        })
}

/// Whether the start of the file is non-empty UTF-8 with no NUL bytes
///
/// A multi-byte sequence cut off by the read limit still counts as text.
fn looks_like_text(path: &Path) -> io::Result<bool> {
    let mut head = Vec::new();
    File::open(path)?.take(TEXT_SNIFF_BYTES).read_to_end(&mut head)?;

    if head.is_empty() || head.contains(&0) {
        return Ok(false);
    }

    Ok(match std::str::from_utf8(&head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none() && head.len() as u64 == TEXT_SNIFF_BYTES,
    })
}

/// Map a file name's extension through the fixed fallback table
pub fn media_type_from_name(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();

    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
}

/// Extract bounded text from the file at `path`
///
/// `declared_name` is the client-supplied file name; it drives the extension
/// fallback and appears in image descriptions. This function is synchronous
/// and touches nothing but the file itself.
pub fn extract(path: &Path, declared_name: &str, max_text_length: usize) -> Extraction {
    let DetectedType { media_type, kind } = detect(path, declared_name);

    let outcome = match kind.extractor() {
        Some(extractor) => extractor(path, declared_name, max_text_length),
        None => Err(ExtractionError::UnsupportedType {
            media_type: media_type.clone(),
        }),
    };

    Extraction {
        media_type,
        kind,
        outcome,
    }
}
