use crate::exif::extract_exif;
use crate::geocode::GeocodeResolver;
use crate::storage::{Change, JsonDocument, ObjectStore, StorageError};
use app_state::BucketSettings;
use common_types::{Catalog, ExifRecord, LocationCandidate, PhotoMetadata};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationBackfillReport {
    pub scanned: usize,
    pub updated: usize,
    pub unreadable: usize,
    pub geocoded: usize,
    pub geocode_failures: usize,
}

struct Found {
    key: String,
    exif: ExifRecord,
    location: Option<LocationCandidate>,
}

/// Fills capture time, GPS position and location of catalog entries from the EXIF data of
/// every stored image. Entries are created for images the catalog doesn't know yet.
pub async fn backfill_locations(
    store: &dyn ObjectStore,
    buckets: &BucketSettings,
    catalog: &JsonDocument<Catalog>,
    geocoder: &GeocodeResolver,
) -> Result<LocationBackfillReport, StorageError> {
    let mut report = LocationBackfillReport::default();
    let mut found = vec![];

    for key in store.list(&buckets.images).await? {
        report.scanned += 1;
        let Some(bytes) = store.get(&buckets.images, &key).await? else {
            continue;
        };
        let exif = match extract_exif(&bytes) {
            Ok(exif) => exif,
            Err(e) => {
                warn!("Skipping {key}: {e}");
                report.unreadable += 1;
                continue;
            }
        };

        let mut location = None;
        if let Some((lat, lon)) = exif.coordinates() {
            match geocoder.resolve(lat, lon).await {
                Ok(resolved) => {
                    report.geocoded += usize::from(resolved.is_some());
                    location = resolved;
                }
                Err(e) => {
                    warn!("Reverse geocoding {key} failed: {e}");
                    report.geocode_failures += 1;
                }
            }
        }
        found.push(Found {
            key,
            exif,
            location,
        });
    }

    report.updated = found.len();
    catalog
        .update(|catalog| {
            for Found { key, exif, location } in &found {
                let entry = catalog.entry(key.clone()).or_insert_with(|| PhotoMetadata {
                    filename: key.clone(),
                    ..Default::default()
                });
                if exif.capture_time.is_some() {
                    entry.capture_time = exif.capture_time;
                }
                if let Some((lat, lon)) = exif.coordinates() {
                    entry.gps_latitude = lat;
                    entry.gps_longitude = lon;
                }
                if location.is_some() {
                    entry.location.clone_from(location);
                }
            }
            if found.is_empty() {
                Change::Discard(())
            } else {
                Change::Commit(())
            }
        })
        .await?;

    info!("Location backfill done: {report:?}");
    Ok(report)
}
