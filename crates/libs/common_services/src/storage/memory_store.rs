use crate::storage::{ETag, ObjectStore, StorageError, VersionedObject, validate_key};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
    etag: ETag,
}

/// Process-local object store. Used for development and tests.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>,
}

impl MemoryObjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded for an object, if it exists.
    #[cfg(test)]
    pub async fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        let buckets = self.buckets.read().await;
        buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .map(|o| o.content_type.clone())
    }

    fn store(
        buckets: &mut BTreeMap<String, BTreeMap<String, StoredObject>>,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> ETag {
        let etag = ETag::of(&body);
        buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
                etag: etag.clone(),
            },
        );
        etag
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_versioned(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<VersionedObject>, StorageError> {
        validate_key(key)?;
        let buckets = self.buckets.read().await;
        Ok(buckets.get(bucket).and_then(|b| b.get(key)).map(|o| VersionedObject {
            body: o.body.clone(),
            etag: o.etag.clone(),
        }))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ETag, StorageError> {
        validate_key(key)?;
        let mut buckets = self.buckets.write().await;
        Ok(Self::store(&mut buckets, bucket, key, body, content_type))
    }

    async fn put_if_match(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        expected: Option<&ETag>,
    ) -> Result<ETag, StorageError> {
        validate_key(key)?;
        let mut buckets = self.buckets.write().await;
        let current = buckets.get(bucket).and_then(|b| b.get(key)).map(|o| &o.etag);
        if current != expected {
            return Err(StorageError::Conflict {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        Ok(Self::store(&mut buckets, bucket, key, body, content_type))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let mut buckets = self.buckets.write().await;
        if let Some(objects) = buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default())
    }
}
