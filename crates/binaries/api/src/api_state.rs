use app_state::AppSettings;
use axum::extract::FromRef;
use common_services::api::photos::service::PhotoService;
use common_services::api::requests::service::RequestsService;
use common_services::notify::Notifier;
use common_services::rate_limit::Clock;
use common_services::storage::ObjectStore;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct ApiState {
    pub photos: PhotoService,
    pub requests: RequestsService,
}

impl ApiState {
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        http_client: Client,
        settings: &AppSettings,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let buckets = settings.storage.buckets.clone();
        let requests = RequestsService::new(
            store.clone(),
            &buckets.api,
            notifier,
            clock,
            settings.rate_limit.cooldown,
        );
        let photos = PhotoService::new(store, http_client, buckets, settings.ingest.clone());
        Self { photos, requests }
    }
}

impl FromRef<ApiState> for PhotoService {
    fn from_ref(state: &ApiState) -> Self {
        state.photos.clone()
    }
}

impl FromRef<ApiState> for RequestsService {
    fn from_ref(state: &ApiState) -> Self {
        state.requests.clone()
    }
}
