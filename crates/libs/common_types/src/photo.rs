use crate::LocationCandidate;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// The catalog document: photo id -> metadata.
pub type Catalog = BTreeMap<String, PhotoMetadata>;

/// Metadata for a single photo, as stored in the catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Builder)]
#[serde(default)]
pub struct PhotoMetadata {
    #[builder(into, default)]
    pub filename: String,
    #[serde(rename = "datetimeOriginal")]
    pub capture_time: Option<DateTime<Utc>>,
    #[serde(rename = "gpsLatitude")]
    #[builder(default)]
    pub gps_latitude: f64,
    #[serde(rename = "gpsLongitude")]
    #[builder(default)]
    pub gps_longitude: f64,
    pub location: Option<LocationCandidate>,
    #[builder(into, default)]
    pub category: String,
    #[builder(into, default)]
    pub tags: String,
}

/// Field-wise update for a catalog entry. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PhotoMetadataPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "datetimeOriginal", skip_serializing_if = "Option::is_none")]
    pub capture_time: Option<DateTime<Utc>>,
    #[serde(rename = "gpsLatitude", skip_serializing_if = "Option::is_none")]
    pub gps_latitude: Option<f64>,
    #[serde(rename = "gpsLongitude", skip_serializing_if = "Option::is_none")]
    pub gps_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

impl PhotoMetadata {
    /// Merge every field present in `patch` into `self`.
    pub fn apply_patch(&mut self, patch: PhotoMetadataPatch) {
        if let Some(filename) = patch.filename {
            self.filename = filename;
        }
        if let Some(capture_time) = patch.capture_time {
            self.capture_time = Some(capture_time);
        }
        if let Some(lat) = patch.gps_latitude {
            self.gps_latitude = lat;
        }
        if let Some(lon) = patch.gps_longitude {
            self.gps_longitude = lon;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }
}

/// One item of an upload batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Builder)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUploadRequest {
    /// Where the source image can be downloaded from.
    #[serde(rename = "url", alias = "sourceUrl")]
    #[builder(into)]
    pub source_url: String,
    #[builder(into)]
    pub filename: String,
    #[builder(into)]
    pub mime_type: String,
    /// Catalog key, also used as the object key for image and thumbnail.
    #[builder(into)]
    pub id: String,
    #[serde(default)]
    #[builder(default)]
    pub metadata: PhotoMetadata,
}

/// A thumbnail together with its catalog metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PhotoSummary {
    pub id: String,
    /// Base64 encoded JPEG thumbnail.
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    #[schema(value_type = String, format = Byte)]
    pub body: Vec<u8>,
    pub metadata: PhotoMetadata,
}

fn to_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    STANDARD.decode(encoded).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_uses_catalog_field_names() {
        let metadata = PhotoMetadata::builder()
            .filename("a1")
            .gps_latitude(45.5)
            .category("live")
            .build();
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["filename"], "a1");
        assert_eq!(value["gpsLatitude"], 45.5);
        assert_eq!(value["gpsLongitude"], 0.0);
        assert_eq!(value["datetimeOriginal"], serde_json::Value::Null);
        assert_eq!(value["category"], "live");
    }

    #[test]
    fn partial_metadata_deserializes_with_defaults() {
        let metadata: PhotoMetadata = serde_json::from_value(json!({ "tags": "drums" })).unwrap();
        assert_eq!(metadata.tags, "drums");
        assert!(metadata.filename.is_empty());
        assert!(metadata.location.is_none());
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut metadata = PhotoMetadata::builder()
            .filename("a1")
            .category("live")
            .tags("stage")
            .build();
        let patch: PhotoMetadataPatch =
            serde_json::from_value(json!({ "category": "studio" })).unwrap();
        metadata.apply_patch(patch);
        assert_eq!(metadata.category, "studio");
        assert_eq!(metadata.tags, "stage");
        assert_eq!(metadata.filename, "a1");
    }

    #[test]
    fn upload_request_reads_url_field() {
        let request: PhotoUploadRequest = serde_json::from_value(json!({
            "url": "http://example.com/a1.jpg",
            "filename": "a1.jpg",
            "mimeType": "image/jpeg",
            "id": "a1"
        }))
        .unwrap();
        assert_eq!(request.source_url, "http://example.com/a1.jpg");
        assert_eq!(request.mime_type, "image/jpeg");
        assert_eq!(request.metadata, PhotoMetadata::default());
    }

    #[test]
    fn summary_body_is_base64() {
        let summary = PhotoSummary {
            id: "a1".to_string(),
            body: vec![0xFF, 0xD8, 0xFF],
            metadata: PhotoMetadata::default(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["body"], "/9j/");
        let back: PhotoSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back.body, vec![0xFF, 0xD8, 0xFF]);
    }
}
