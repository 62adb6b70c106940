use crate::storage::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a stored object, handed out by versioned reads and required by
/// conditional writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ETag(String);

impl ETag {
    #[must_use]
    pub fn of(body: &[u8]) -> Self {
        Self(blake3::hash(body).to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct VersionedObject {
    pub body: Bytes,
    pub etag: ETag,
}

/// A bucket/key blob store.
///
/// `delete` must succeed for keys that do not exist, rollbacks rely on it.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_versioned(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<VersionedObject>, StorageError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>, StorageError> {
        Ok(self.get_versioned(bucket, key).await?.map(|o| o.body))
    }

    /// Unconditional write, the last writer wins.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ETag, StorageError>;

    /// Writes only if the current version matches `expected`. `None` means the object
    /// must not exist yet. Fails with [`StorageError::Conflict`] otherwise.
    async fn put_if_match(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        expected: Option<&ETag>,
    ) -> Result<ETag, StorageError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// All keys in `bucket`, sorted.
    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError>;
}

/// Rejects keys that could escape their bucket or collide with temp files.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0'])
        || key.len() > 255;
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
