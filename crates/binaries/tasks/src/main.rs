use app_state::{AppSettings, CATALOG_KEY, settings};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use common_services::geocode::GeocodeResolver;
use common_services::maintenance::{backfill_locations, backfill_thumbnails};
use common_services::storage::{FsObjectStore, JsonDocument, ObjectStore, TimedObjectStore};
use common_services::utils::http_client;
use common_types::Catalog;
use generate_thumbnails::ThumbOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasks")]
#[command(about = "Maintenance jobs for stored photos", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Fill capture time, GPS position and location from EXIF data")]
    BackfillLocations,

    #[command(about = "Generate thumbnails for images that don't have one")]
    BackfillThumbnails,
}

fn object_store(settings: &AppSettings) -> Arc<dyn ObjectStore> {
    Arc::new(TimedObjectStore::new(
        Arc::new(FsObjectStore::new(settings.storage.root.clone())),
        settings.timeouts.external_call,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("tasks={0},common_services={0}", settings().logging.level).into()
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
    color_eyre::install()?;

    let cli = Cli::parse();
    let settings = settings();
    let store = object_store(settings);
    let buckets = &settings.storage.buckets;

    match cli.command {
        Commands::BackfillLocations => {
            let catalog: JsonDocument<Catalog> =
                JsonDocument::new(store.clone(), buckets.api.clone(), CATALOG_KEY);
            let geocoder = GeocodeResolver::new(
                http_client(settings.timeouts.external_call)?,
                &settings.geocode,
            )?;
            let report = backfill_locations(store.as_ref(), buckets, &catalog, &geocoder).await?;
            info!("Location backfill done: {report:?}");
        }
        Commands::BackfillThumbnails => {
            let options = ThumbOptions::from(&settings.ingest.thumbnail);
            let report = backfill_thumbnails(store.as_ref(), buckets, options).await?;
            info!("Thumbnail backfill done: {report:?}");
        }
    }
    Ok(())
}
