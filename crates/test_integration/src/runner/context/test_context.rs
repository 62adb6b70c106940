use crate::test_helpers::serve_sources;
use api::api_state::ApiState;
use api::create_router;
use app_state::{AppSettings, load_app_settings_from};
use color_eyre::eyre::{Result, eyre};
use common_services::notify::TracingNotifier;
use common_services::rate_limit::SystemClock;
use common_services::storage::{FsObjectStore, ObjectStore};
use common_services::utils::http_client;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// The main context for the integration tests: the real router on a random port, backed by
/// a filesystem store in a temporary directory, plus a server hosting source images.
#[allow(dead_code)]
pub struct TestContext {
    pub settings: AppSettings,
    pub http_client: Client,
    pub store: Arc<dyn ObjectStore>,
    /// Base url of the source image server.
    pub sources_url: String,
    storage_dir: TempDir,
    api_handle: JoinHandle<()>,
    sources_handle: JoinHandle<()>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        info!("Setting up test environment...");

        let settings_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/settings.yaml");
        let mut settings = load_app_settings_from(&settings_path)?;

        let storage_dir = tempfile::tempdir()?;
        settings.storage.root = storage_dir.path().to_path_buf();
        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(storage_dir.path()));

        let (sources_url, sources_handle) = serve_sources().await?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        settings.api.port = u32::from(address.port());
        settings.api.public_url = format!("http://{address}");

        let state = ApiState::new(
            store.clone(),
            http_client(settings.timeouts.external_call)?,
            &settings,
            Arc::new(TracingNotifier),
            Arc::new(SystemClock),
        );
        let app = create_router(state);
        let api_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("API server failed: {}", e);
            }
        });

        let http_client = Client::new();
        Self::wait_for_healthy_api(&settings, &http_client).await?;

        info!("Test environment is ready.");
        Ok(Self {
            settings,
            http_client,
            store,
            sources_url,
            storage_dir,
            api_handle,
            sources_handle,
        })
    }

    /// Url of an api route.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api.public_url)
    }

    /// Polls `/health` until it succeeds or gives up.
    async fn wait_for_healthy_api(settings: &AppSettings, http_client: &Client) -> Result<()> {
        let health_url = format!("{}/health", &settings.api.public_url);
        for attempt in 1..=20 {
            match http_client.get(&health_url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("API is healthy after {attempt} attempts");
                    return Ok(());
                }
                Ok(response) => warn!("API health check returned {}", response.status()),
                Err(e) => warn!("API health check failed: {e:?}. Retrying..."),
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        Err(eyre!("API did not become healthy within the timeout period."))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.api_handle.abort();
        self.sources_handle.abort();
    }
}
