use crate::{
    AcceptedFormat, ApiSettings, BucketSettings, GeocodeSettings, IngestSettings, LoggingSettings,
    RawSettings, file_extension,
};
use color_eyre::Result;
use std::path::{PathBuf, absolute};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub ingest: IngestSettings,
    pub geocode: GeocodeSettings,
    pub rate_limit: RateLimitSettings,
    pub timeouts: TimeoutSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub root: PathBuf,
    pub buckets: BucketSettings,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub cooldown: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct TimeoutSettings {
    pub external_call: Duration,
}

impl TryFrom<RawSettings> for AppSettings {
    type Error = color_eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let storage = StorageSettings {
            root: absolute(&raw.storage.root)?,
            buckets: raw.storage.buckets,
        };

        Ok(Self {
            api: raw.api,
            storage,
            ingest: raw.ingest,
            geocode: raw.geocode,
            rate_limit: RateLimitSettings {
                cooldown: Duration::from_secs(raw.rate_limit.cooldown_seconds),
            },
            timeouts: TimeoutSettings {
                external_call: Duration::from_secs(raw.timeouts.external_call_seconds),
            },
            logging: raw.logging,
        })
    }
}

impl IngestSettings {
    /// The accepted format declared by `mime_type`, if any.
    #[must_use]
    pub fn format_for_mime(&self, mime_type: &str) -> Option<&AcceptedFormat> {
        self.accepted_formats
            .iter()
            .find(|f| f.mime_type.eq_ignore_ascii_case(mime_type))
    }

    /// Whether `filename` carries one of the extensions registered for `format`.
    #[must_use]
    pub fn extension_matches(format: &AcceptedFormat, filename: &str) -> bool {
        let Some(extension) = file_extension(filename) else {
            return false;
        };
        format.extensions.contains(&extension)
    }

    #[must_use]
    pub fn is_canonical(&self, mime_type: &str) -> bool {
        self.canonical_mime_type.eq_ignore_ascii_case(mime_type)
    }
}
