use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings exactly as they appear in `config/settings.yaml` and `APP__*` env vars.
#[derive(Debug, Deserialize, Clone)]
pub struct RawSettings {
    pub api: ApiSettings,
    pub storage: RawStorageSettings,
    pub ingest: IngestSettings,
    pub geocode: GeocodeSettings,
    pub rate_limit: RawRateLimitSettings,
    pub timeouts: RawTimeoutSettings,
    pub logging: LoggingSettings,
}

/// Configuration for the API server.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub host: String,
    pub port: u32,
    pub allowed_origins: Vec<String>,
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawStorageSettings {
    /// Folder under which every bucket gets its own directory.
    pub root: PathBuf,
    pub buckets: BucketSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BucketSettings {
    /// Holds the catalog, the permission ledger and song requests.
    pub api: String,
    pub images: String,
    pub thumbnails: String,
}

/// Which uploads are accepted and how they are turned into stored images.
#[derive(Debug, Deserialize, Clone)]
pub struct IngestSettings {
    /// The format everything is stored as.
    pub canonical_mime_type: String,
    pub accepted_formats: Vec<AcceptedFormat>,
    pub thumbnail: ThumbnailSettings,
    /// JPEG quality used when converting a non-canonical upload.
    pub normalize_quality: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AcceptedFormat {
    pub mime_type: String,
    /// Lowercase, without the leading dot.
    pub extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodeSettings {
    /// Base url of a positionstack compatible service, ending in a slash.
    pub endpoint: String,
    pub access_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawRateLimitSettings {
    pub cooldown_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawTimeoutSettings {
    /// Upper bound for each download, store call and geocode lookup.
    pub external_call_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}
