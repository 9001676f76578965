//! Where uploaded bytes live
//!
//! Routes and the service only ever hand validated [`StorageId`]s to an
//! [`AttachmentStore`], so no filesystem path is ever built from raw input.

use std::fmt;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

const MAX_ID_LENGTH: usize = 128;

/// Errors from an attachment store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Nothing stored under the requested id
    #[error("not found")]
    NotFound,

    /// Identifier outside `[A-Za-z0-9_-]{1,128}`
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("storage I/O error: {0}")]
    Io(#[source] io::Error),
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(error)
        }
    }
}

/// Conversation or file identifier safe to use as a single path component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageId(String);

impl StorageId {
    /// Validate a client-supplied identifier
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let valid = !raw.is_empty()
            && raw.len() <= MAX_ID_LENGTH
            && raw.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        if valid {
            Ok(Self(raw.to_owned()))
        } else {
            Err(StorageError::InvalidId(raw.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Byte storage for uploaded files, grouped by conversation
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    /// Store `bytes` and return the path extraction should read from
    async fn put(&self, conversation: &StorageId, file: &StorageId, bytes: &[u8]) -> Result<PathBuf, StorageError>;

    /// Remove one file
    async fn delete(&self, conversation: &StorageId, file: &StorageId) -> Result<(), StorageError>;

    /// Remove every file of a conversation
    async fn delete_all(&self, conversation: &StorageId) -> Result<(), StorageError>;
}

/// Stores files on the local filesystem under `<root>/<conversation>/<file>`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn conversation_dir(&self, conversation: &StorageId) -> PathBuf {
        self.root.join(conversation.as_str())
    }
}

#[async_trait]
impl AttachmentStore for LocalStore {
    async fn put(&self, conversation: &StorageId, file: &StorageId, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let dir = self.conversation_dir(conversation);
        tokio::fs::create_dir_all(&dir).await.map_err(StorageError::Io)?;

        let path = dir.join(file.as_str());
        tokio::fs::write(&path, bytes).await.map_err(StorageError::Io)?;

        Ok(path)
    }

    async fn delete(&self, conversation: &StorageId, file: &StorageId) -> Result<(), StorageError> {
        let path = self.conversation_dir(conversation).join(file.as_str());
        tokio::fs::remove_file(path).await?;
        Ok(())
    }

    async fn delete_all(&self, conversation: &StorageId) -> Result<(), StorageError> {
        tokio::fs::remove_dir_all(self.conversation_dir(conversation)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> StorageId {
        StorageId::parse(raw).unwrap()
    }

    #[test]
    fn ids_are_restricted_to_a_safe_charset() {
        assert!(StorageId::parse("conv_01-ab").is_ok());
        assert!(StorageId::parse(&"a".repeat(128)).is_ok());

        for bad in ["", "../etc", "a/b", "a.b", "spaced id", "é", &"a".repeat(129)] {
            assert!(
                matches!(StorageId::parse(bad), Err(StorageError::InvalidId(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn put_writes_under_conversation_directory() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path());

        let path = store.put(&id("c1"), &id("f1"), b"hello").await.unwrap();

        assert_eq!(path, root.path().join("c1").join("f1"));
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn delete_reports_missing_files() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path());

        store.put(&id("c1"), &id("f1"), b"x").await.unwrap();
        store.delete(&id("c1"), &id("f1")).await.unwrap();

        assert!(matches!(
            store.delete(&id("c1"), &id("f1")).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_all_removes_the_conversation() {
        let root = tempfile::tempdir().unwrap();
        let store = LocalStore::new(root.path());

        store.put(&id("c1"), &id("f1"), b"x").await.unwrap();
        store.put(&id("c1"), &id("f2"), b"y").await.unwrap();
        store.put(&id("c2"), &id("f1"), b"z").await.unwrap();

        store.delete_all(&id("c1")).await.unwrap();

        assert!(!root.path().join("c1").exists());
        assert!(root.path().join("c2").join("f1").exists());
        assert!(matches!(store.delete_all(&id("c1")).await, Err(StorageError::NotFound)));
    }
}
