use std::sync::Arc;

use parley_config::UploadsConfig;

use crate::{
    attachment::Attachment,
    error::FileError,
    extract,
    storage::{AttachmentStore, LocalStore, StorageError, StorageId},
};

/// Stores uploads and turns them into [`Attachment`]s
#[derive(Clone)]
pub struct FileService {
    store: Arc<dyn AttachmentStore>,
    max_upload_bytes: usize,
    max_text_length: usize,
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_text_length", &self.max_text_length)
            .finish_non_exhaustive()
    }
}

impl FileService {
    pub fn new(store: Arc<dyn AttachmentStore>, max_upload_bytes: usize, max_text_length: usize) -> Self {
        Self {
            store,
            max_upload_bytes,
            max_text_length,
        }
    }

    /// Service backed by a [`LocalStore`] rooted at the configured upload directory
    pub fn from_config(config: &UploadsConfig) -> Self {
        Self::new(
            Arc::new(LocalStore::new(&config.directory)),
            config.max_upload_bytes,
            config.max_text_length,
        )
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Store an upload and extract its text
    ///
    /// Extraction failures do not fail the upload; they are recorded on the
    /// returned attachment as `parse_error`.
    pub async fn upload(&self, conversation_id: &str, name: &str, bytes: &[u8]) -> Result<Attachment, FileError> {
        let conversation = StorageId::parse(conversation_id)?;

        if bytes.len() > self.max_upload_bytes {
            return Err(FileError::PayloadTooLarge {
                limit: self.max_upload_bytes,
            });
        }

        let file_id = uuid::Uuid::new_v4().simple().to_string();
        let file = StorageId::parse(&file_id)?;
        let path = self.store.put(&conversation, &file, bytes).await?;

        let declared_name = name.to_owned();
        let max_text_length = self.max_text_length;
        let extraction = tokio::task::spawn_blocking(move || extract::extract(&path, &declared_name, max_text_length))
            .await
            .map_err(|e| FileError::Internal(format!("extraction task failed: {e}")))?;

        match &extraction.outcome {
            Ok(extracted) => tracing::debug!(
                conversation = %conversation,
                file = %file,
                media_type = %extraction.media_type,
                chars = extracted.text.chars().count(),
                truncated = extracted.truncated,
                "extracted upload"
            ),
            Err(e) => tracing::warn!(
                conversation = %conversation,
                file = %file,
                media_type = %extraction.media_type,
                error = %e,
                "could not extract text from upload"
            ),
        }

        Ok(Attachment::from_extraction(
            file_id,
            name.to_owned(),
            bytes.len() as u64,
            extraction,
        ))
    }

    /// Delete one stored file; an absent file counts as deleted
    pub async fn delete(&self, conversation_id: &str, file_id: &str) -> Result<(), FileError> {
        let conversation = StorageId::parse(conversation_id)?;
        let file = StorageId::parse(file_id)?;

        match self.store.delete(&conversation, &file).await {
            Ok(()) | Err(StorageError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete every file of a conversation; an absent conversation counts as deleted
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), FileError> {
        let conversation = StorageId::parse(conversation_id)?;

        match self.store.delete_all(&conversation).await {
            Ok(()) | Err(StorageError::NotFound) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
