use crate::storage::{ETag, ObjectStore, StorageError, VersionedObject, validate_key};
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

/// Object store on the local filesystem: every bucket is a directory below `root`,
/// every object a file named after its key.
///
/// Writes go through a temp file in the bucket directory followed by a rename, so readers
/// never observe partial objects. Conditional writes are serialized by an in-process lock,
/// which makes them atomic for a single server process.
#[derive(Debug)]
pub struct FsObjectStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf, StorageError> {
        validate_key(bucket)?;
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.bucket_dir(bucket)?.join(key))
    }

    async fn read(path: &Path) -> Result<Option<Bytes>, StorageError> {
        match fs::read(path).await {
            Ok(body) => Ok(Some(Bytes::from(body))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, bucket: &str, key: &str, body: &Bytes) -> Result<ETag, StorageError> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(&dir).await?;
        let destination = self.object_path(bucket, key)?;

        let temp = tempfile::Builder::new().prefix(".upload").tempfile_in(&dir)?;
        let temp_path = temp.into_temp_path();
        fs::write(&temp_path, body).await?;
        temp_path
            .persist(&destination)
            .map_err(|e| StorageError::Io(e.error))?;

        Ok(ETag::of(body))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn get_versioned(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<VersionedObject>, StorageError> {
        let path = self.object_path(bucket, key)?;
        Ok(Self::read(&path).await?.map(|body| VersionedObject {
            etag: ETag::of(&body),
            body,
        }))
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ETag, StorageError> {
        debug!("put {bucket}/{key} ({content_type}, {} bytes)", body.len());
        self.write(bucket, key, &body).await
    }

    async fn put_if_match(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        expected: Option<&ETag>,
    ) -> Result<ETag, StorageError> {
        let _guard = self.write_lock.lock().await;
        let path = self.object_path(bucket, key)?;
        let current = Self::read(&path).await?.map(|b| ETag::of(&b));
        if current.as_ref() != expected {
            return Err(StorageError::Conflict {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        debug!("conditional put {bucket}/{key} ({content_type}, {} bytes)", body.len());
        self.write(bucket, key, &body).await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.bucket_dir(bucket)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut keys = vec![];
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if validate_key(&name).is_ok() {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
