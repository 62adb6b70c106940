use crate::storage::{ETag, ObjectStore, StorageError, VersionedObject};
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Wraps another store and fails any call that takes longer than `limit`.
#[derive(Clone)]
pub struct TimedObjectStore {
    inner: Arc<dyn ObjectStore>,
    limit: Duration,
}

impl TimedObjectStore {
    pub fn new(inner: Arc<dyn ObjectStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T: Send>(
        &self,
        operation: String,
        call: impl Future<Output = Result<T, StorageError>> + Send,
    ) -> Result<T, StorageError> {
        timeout(self.limit, call)
            .await
            .map_err(|_| StorageError::Timeout(operation))?
    }
}

#[async_trait]
impl ObjectStore for TimedObjectStore {
    async fn get_versioned(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<VersionedObject>, StorageError> {
        self.bounded(format!("get {bucket}/{key}"), self.inner.get_versioned(bucket, key))
            .await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ETag, StorageError> {
        self.bounded(
            format!("put {bucket}/{key}"),
            self.inner.put(bucket, key, body, content_type),
        )
        .await
    }

    async fn put_if_match(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        expected: Option<&ETag>,
    ) -> Result<ETag, StorageError> {
        self.bounded(
            format!("put {bucket}/{key}"),
            self.inner
                .put_if_match(bucket, key, body, content_type, expected),
        )
        .await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.bounded(format!("delete {bucket}/{key}"), self.inner.delete(bucket, key))
            .await
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        self.bounded(format!("list {bucket}"), self.inner.list(bucket))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;

    struct SlowStore;

    #[async_trait]
    impl ObjectStore for SlowStore {
        async fn get_versioned(
            &self,
            _bucket: &str,
            _key: &str,
        ) -> Result<Option<VersionedObject>, StorageError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn put(&self, _: &str, _: &str, body: Bytes, _: &str) -> Result<ETag, StorageError> {
            Ok(ETag::of(&body))
        }

        async fn put_if_match(
            &self,
            _: &str,
            _: &str,
            body: Bytes,
            _: &str,
            _: Option<&ETag>,
        ) -> Result<ETag, StorageError> {
            Ok(ETag::of(&body))
        }

        async fn delete(&self, _: &str, _: &str) -> Result<(), StorageError> {
            Ok(())
        }

        async fn list(&self, _: &str) -> Result<Vec<String>, StorageError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn slow_calls_time_out() {
        let store = TimedObjectStore::new(Arc::new(SlowStore), Duration::from_millis(20));
        let result = store.get("images", "a1").await;
        assert!(matches!(result, Err(StorageError::Timeout(_))));
    }

    #[tokio::test]
    async fn fast_calls_pass_through() -> Result<(), StorageError> {
        let store =
            TimedObjectStore::new(Arc::new(MemoryObjectStore::new()), Duration::from_secs(1));
        store.put("images", "a1", Bytes::from_static(b"x"), "image/jpeg").await?;
        assert_eq!(store.list("images").await?, vec!["a1"]);
        Ok(())
    }
}
