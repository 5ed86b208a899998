//! Local filesystem storage backend

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{StorageError, StorageProvider, StorageResult, StoredObject};

/// Filesystem-backed storage. Objects are written under a single root
/// directory with uuid-derived names; the original extension is kept so
/// files stay recognizable on disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create the backend, ensuring the root directory exists.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn key_for(filename: &str) -> String {
        let id = uuid::Uuid::new_v4();
        match Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if !ext.is_empty() => format!("{id}.{ext}"),
            _ => id.to_string(),
        }
    }

    // Keys are generated here and never contain separators; anything
    // else is rejected before it can escape the root.
    fn checked_key(key: &str) -> StorageResult<&str> {
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(key)
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    async fn save(
        &self,
        bytes: &[u8],
        filename: &str,
        _content_type: &str,
    ) -> StorageResult<StoredObject> {
        let key = Self::key_for(filename);
        let path = self.root.join(&key);
        fs::write(&path, bytes).await?;

        tracing::debug!(key = %key, size = bytes.len(), "stored attachment");
        Ok(StoredObject {
            key,
            size: bytes.len() as i64,
        })
    }

    async fn presign(&self, _key: &str) -> StorageResult<Option<String>> {
        // No signing capability for plain files.
        Ok(None)
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        Self::checked_key(key).ok().map(|key| self.root.join(key))
    }
}
