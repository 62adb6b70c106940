use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A visitor's song request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SongRequest {
    /// Set by the server when the request is accepted.
    pub time: Option<DateTime<Utc>>,
    pub session: String,
    pub name: String,
    pub message: String,
    pub song: String,
    pub artist: String,
}
