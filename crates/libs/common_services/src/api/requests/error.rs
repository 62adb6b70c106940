use crate::storage::StorageError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use color_eyre::eyre;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum RequestsError {
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("song and artist required")]
    MissingSongOrArtist,

    #[error("Too many requests from this session, try again in {retry_after_secs} seconds")]
    Throttled { retry_after_secs: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Could not deliver the request: {0}")]
    Notify(eyre::Report),
}

impl RequestsError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::MissingSongOrArtist => StatusCode::BAD_REQUEST,
            Self::Throttled { .. } => StatusCode::FORBIDDEN,
            Self::Storage(_) | Self::Notify(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RequestsError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Requests -> {self:?}");
        } else {
            warn!("Requests -> rejected: {self}");
        }

        let body = Json(json!({ "error": self.to_string(), "code": status.as_u16() }));
        (status, body).into_response()
    }
}
