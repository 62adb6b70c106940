#![allow(clippy::needless_for_each, clippy::missing_errors_doc)]

pub mod api_state;
pub mod routes;

pub use routes::*;

use crate::api_state::ApiState;
use app_state::AppSettings;
use color_eyre::Result;
use common_services::notify::TracingNotifier;
use common_services::rate_limit::SystemClock;
use common_services::storage::{FsObjectStore, ObjectStore, TimedObjectStore};
use common_services::utils::http_client;
use http::{HeaderValue, header};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{self, CorsLayer};
use tracing::{error, info};

/// Wires the production dependencies: a filesystem object store below `storage.root`,
/// bounded by the external call timeout, and the log-only notifier.
pub fn build_state(settings: &AppSettings) -> Result<ApiState> {
    let timeout = settings.timeouts.external_call;
    let store: Arc<dyn ObjectStore> = Arc::new(TimedObjectStore::new(
        Arc::new(FsObjectStore::new(settings.storage.root.clone())),
        timeout,
    ));

    Ok(ApiState::new(
        store,
        http_client(timeout)?,
        settings,
        Arc::new(TracingNotifier),
        Arc::new(SystemClock),
    ))
}

fn cors_layer(allowed: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(hv) => Some(hv),
            Err(e) => {
                error!("Invalid CORS origin configured: {} - Error: {}", s, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(allowed_origins)
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::USER_AGENT,
            header::CACHE_CONTROL,
            header::PRAGMA,
        ])
}

/// Builds the state from `settings` and serves the api until the listener fails.
pub async fn serve(settings: AppSettings) -> Result<()> {
    info!("🚀 Initializing server...");
    let state = build_state(&settings)?;

    let app = create_router(state)
        .layer(cors_layer(&settings.api.allowed_origins))
        .layer(CompressionLayer::new());
    let listen_address = format!("{}:{}", settings.api.host, settings.api.port);
    let listener = tokio::net::TcpListener::bind(&listen_address).await?;

    info!("📚 Docs available at http://{listen_address}/docs");
    info!("✅ Server listening on http://{listen_address}");

    axum::serve(listener, app).await?;
    Ok(())
}
