use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One reverse-geocoding result. Field names follow the positionstack wire format,
/// which reports missing parts as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LocationCandidate {
    pub label: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "number")]
    pub street_number: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub region_code: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub map_url: Option<String>,
    pub confidence: f64,
}

/// Body of a reverse-geocoding response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub data: Vec<LocationCandidate>,
}
