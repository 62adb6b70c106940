use chrono::{DateTime, Utc};
use serde::Serialize;

/// Capture data read from an image's EXIF segment. Never persisted directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExifRecord {
    pub capture_time: Option<DateTime<Utc>>,
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    /// Fields that were missing or malformed.
    pub warnings: Vec<ExifWarning>,
}

impl ExifRecord {
    /// Both coordinates, when the image carried a usable GPS position.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.gps_latitude.zip(self.gps_longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExifWarning {
    MissingCaptureTime,
    MalformedCaptureTime(String),
    MissingGps,
    MalformedGps(String),
}
