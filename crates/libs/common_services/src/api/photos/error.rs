use crate::storage::StorageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum PhotosError {
    #[error("Photo id is missing or invalid: {0:?}")]
    InvalidId(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File extension of {filename:?} does not match {mime_type}")]
    InvalidExtension { filename: String, mime_type: String },

    #[error("Query parameter 'name' is required")]
    MissingName,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("Image processing failed: {0}")]
    Image(eyre::Report),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("internal error")]
    Internal(#[from] eyre::Report),
}

impl PhotosError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_)
            | Self::UnsupportedMediaType(_)
            | Self::InvalidExtension { .. }
            | Self::MissingName
            | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Download { .. } | Self::Image(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PhotosError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!("Photos -> internal error: {e:?}");
                "An unexpected internal error occurred.".to_string()
            }
            other if status.is_server_error() => {
                error!("Photos -> {other}");
                other.to_string()
            }
            other => {
                warn!("Photos -> rejected request: {other}");
                other.to_string()
            }
        };

        let body = Json(json!({ "error": message, "code": status.as_u16() }));
        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for PhotosError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(eyre::Report::new(err))
    }
}
