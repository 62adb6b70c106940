use api::serve;
use app_state::settings;
use color_eyre::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("api={0},common_services={0},tower_http=debug", settings().logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    color_eyre::install()?;

    serve(settings().clone()).await
}
