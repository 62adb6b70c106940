use crate::storage::{ETag, ObjectStore, StorageError};
use app_state::{DOCUMENT_RETRY_DELAY_MS, DOCUMENT_WRITE_ATTEMPTS, JSON_CONTENT_TYPE};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_retry::RetryIf;
use tokio_retry::strategy::FixedInterval;
use tracing::debug;

/// What an update closure decided to do with the document it was handed.
#[derive(Debug)]
pub enum Change<R> {
    /// Write the modified document back.
    Commit(R),
    /// Leave the stored document untouched.
    Discard(R),
}

/// A single JSON value stored as one object, e.g. the photo catalog.
///
/// `update` runs read-modify-write cycles guarded by the object's [`ETag`] and retries the
/// whole cycle when another writer got in between. `overwrite` is a blind write.
pub struct JsonDocument<T> {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            key: key.into(),
            _marker: PhantomData,
        }
    }

    /// Current value; a missing, empty or `null` document reads as `T::default()`.
    pub async fn read(&self) -> Result<T, StorageError> {
        Ok(self.read_versioned().await?.0)
    }

    pub async fn read_versioned(&self) -> Result<(T, Option<ETag>), StorageError> {
        let Some(object) = self.store.get_versioned(&self.bucket, &self.key).await? else {
            return Ok((T::default(), None));
        };
        let value = if object.body.iter().all(u8::is_ascii_whitespace) {
            T::default()
        } else {
            serde_json::from_slice::<Option<T>>(&object.body)?.unwrap_or_default()
        };
        Ok((value, Some(object.etag)))
    }

    /// Blind write; concurrent writers overwrite each other, the last one wins.
    pub async fn overwrite(&self, value: &T) -> Result<(), StorageError> {
        let body = Bytes::from(serde_json::to_vec(value)?);
        self.store
            .put(&self.bucket, &self.key, body, JSON_CONTENT_TYPE)
            .await?;
        Ok(())
    }

    /// Applies `change` to the latest stored value and writes it back if it was committed.
    /// The closure may run more than once when the document is modified concurrently.
    pub async fn update<R, F>(&self, change: F) -> Result<R, StorageError>
    where
        F: Fn(&mut T) -> Change<R> + Send + Sync,
        R: Send,
    {
        let strategy =
            FixedInterval::from_millis(DOCUMENT_RETRY_DELAY_MS).take(DOCUMENT_WRITE_ATTEMPTS - 1);
        let change = &change;

        RetryIf::spawn(
            strategy,
            || self.try_update(change),
            |e: &StorageError| {
                if e.is_conflict() {
                    debug!("Write conflict on {}/{}, retrying", self.bucket, self.key);
                }
                e.is_conflict()
            },
        )
        .await
    }

    async fn try_update<R, F>(&self, change: &F) -> Result<R, StorageError>
    where
        F: Fn(&mut T) -> Change<R> + Send + Sync,
    {
        let (mut value, etag) = self.read_versioned().await?;
        match change(&mut value) {
            Change::Discard(result) => Ok(result),
            Change::Commit(result) => {
                let body = Bytes::from(serde_json::to_vec(&value)?);
                self.store
                    .put_if_match(
                        &self.bucket,
                        &self.key,
                        body,
                        JSON_CONTENT_TYPE,
                        etag.as_ref(),
                    )
                    .await?;
                Ok(result)
            }
        }
    }
}
