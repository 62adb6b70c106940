use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),

    #[error("Object {bucket}/{key} was modified concurrently")]
    Conflict { bucket: String, key: String },

    #[error("Storage call timed out: {0}")]
    Timeout(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
