use crate::api::requests::error::RequestsError;
use crate::notify::Notifier;
use crate::rate_limit::{Clock, Permission, RateLimiter};
use crate::storage::{Change, JsonDocument, ObjectStore};
use app_state::{LEDGER_KEY, REQUESTS_KEY};
use common_types::SongRequest;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Accepts song requests, at most one per session per cooldown.
#[derive(Clone)]
pub struct RequestsService {
    requests: JsonDocument<Vec<SongRequest>>,
    limiter: RateLimiter,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

impl RequestsService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        api_bucket: &str,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        cooldown: Duration,
    ) -> Self {
        let ledger = JsonDocument::new(store.clone(), api_bucket, LEDGER_KEY);
        Self {
            requests: JsonDocument::new(store, api_bucket, REQUESTS_KEY),
            limiter: RateLimiter::new(ledger, clock.clone()),
            notifier,
            clock,
            cooldown,
        }
    }

    pub async fn list(&self) -> Result<Vec<SongRequest>, RequestsError> {
        Ok(self.requests.read().await?)
    }

    /// Validates, rate limits, stores and forwards a request. Returns it with its time set.
    pub async fn submit(&self, mut request: SongRequest) -> Result<SongRequest, RequestsError> {
        if request.song.trim().is_empty() || request.artist.trim().is_empty() {
            return Err(RequestsError::MissingSongOrArtist);
        }

        let permission = self
            .limiter
            .check_and_record(&request.session, self.cooldown)
            .await?;
        if let Permission::Throttled { retry_after } = permission {
            return Err(RequestsError::Throttled {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }

        request.time = Some(self.clock.now());
        self.requests
            .update(|requests| {
                requests.push(request.clone());
                Change::Commit(())
            })
            .await?;
        info!("Stored song request for {:?} by {:?}", request.song, request.artist);

        self.notifier
            .send(&request)
            .await
            .map_err(RequestsError::Notify)?;
        Ok(request)
    }
}
