//! Attachment handling for Parley
//!
//! Stores uploaded files behind an [`AttachmentStore`], extracts bounded text
//! from them and exposes the upload/delete endpoints.

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod attachment;
mod error;
pub mod extract;
mod routes;
mod service;
pub mod storage;

pub use attachment::{Attachment, Metadata};
pub use error::FileError;
pub use extract::{DetectedType, ExtractedText, Extraction, ExtractionError, FileKind, detect, extract};
pub use routes::endpoint_router;
pub use service::FileService;
pub use storage::{AttachmentStore, LocalStore, StorageError, StorageId};
