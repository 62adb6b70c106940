use super::error::GeocodeError;
use app_state::GeocodeSettings;
use common_types::{GeocodeResponse, LocationCandidate};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Picks the candidate with the highest confidence. On ties the earliest candidate wins.
#[must_use]
pub fn best_location(candidates: Vec<LocationCandidate>) -> Option<LocationCandidate> {
    let mut candidates = candidates.into_iter();
    let first = candidates.next()?;
    Some(candidates.fold(first, |best, candidate| {
        if candidate.confidence > best.confidence {
            candidate
        } else {
            best
        }
    }))
}

/// Reverse geocoding against a positionstack-compatible service.
#[derive(Clone)]
pub struct GeocodeResolver {
    http_client: Client,
    endpoint: Url,
    access_key: String,
}

impl GeocodeResolver {
    pub fn new(http_client: Client, settings: &GeocodeSettings) -> Result<Self, GeocodeError> {
        Ok(Self {
            http_client,
            endpoint: settings.endpoint.parse()?,
            access_key: settings.access_key.clone(),
        })
    }

    /// Best location for a coordinate pair, `None` when the service knows nothing there.
    pub async fn resolve(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<LocationCandidate>, GeocodeError> {
        let url = self.endpoint.join("reverse")?;
        let query = format!("{latitude:.6},{longitude:.6}");
        debug!("Reverse geocoding {query}");

        let response = self
            .http_client
            .get(url)
            .query(&[("access_key", self.access_key.as_str()), ("query", &query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status { status, body });
        }

        let body: GeocodeResponse = response.json().await?;
        Ok(best_location(body.data))
    }
}
