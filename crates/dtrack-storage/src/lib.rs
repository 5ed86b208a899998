//! DTrack attachment storage
//!
//! The binary bytes of defect attachments live behind the
//! [`StorageProvider`] trait; the defect repository only ever sees the
//! opaque storage key this crate hands back. Presigned download URLs
//! and direct filesystem paths are optional capabilities: a backend
//! reports "unavailable" with `None` rather than an error, and callers
//! fall back to the same-origin download endpoint.

mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalStorage;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A stored binary object: the opaque key plus the size actually
/// written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
}

/// Binary storage collaborator for attachment bytes
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Persist the bytes and return the opaque key under which they can
    /// be found again.
    async fn save(
        &self,
        bytes: &[u8],
        filename: &str,
        content_type: &str,
    ) -> StorageResult<StoredObject>;

    /// Temporary signed download URL for the object, or `None` when the
    /// backend cannot issue one.
    async fn presign(&self, key: &str) -> StorageResult<Option<String>>;

    /// Local filesystem path of the object, or `None` when direct
    /// access is unsupported by the backend.
    fn path_for(&self, key: &str) -> Option<PathBuf>;
}
