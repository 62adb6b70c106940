use crate::storage::{ObjectStore, StorageError};
use app_state::BucketSettings;
use bytes::Bytes;
use generate_thumbnails::{ThumbOptions, ensure_supported, generate_thumbnail};
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailBackfillReport {
    pub scanned: usize,
    pub created: usize,
    pub failed: usize,
}

/// Generates and uploads thumbnails for stored images that don't have one yet.
/// Images that can't be thumbnailed are logged and counted, the job keeps going.
pub async fn backfill_thumbnails(
    store: &dyn ObjectStore,
    buckets: &BucketSettings,
    options: ThumbOptions,
) -> Result<ThumbnailBackfillReport, StorageError> {
    let existing: HashSet<String> = store.list(&buckets.thumbnails).await?.into_iter().collect();
    let mut report = ThumbnailBackfillReport::default();

    for key in store.list(&buckets.images).await? {
        report.scanned += 1;
        if existing.contains(&key) {
            continue;
        }
        let Some(image) = store.get(&buckets.images, &key).await? else {
            continue;
        };

        let generated = tokio::task::spawn_blocking(move || {
            ensure_supported(&image)?;
            generate_thumbnail(&image, &options)
        })
        .await;
        let thumbnail = match generated {
            Ok(Ok(thumbnail)) => thumbnail,
            Ok(Err(e)) => {
                warn!("Could not thumbnail {key}: {e}");
                report.failed += 1;
                continue;
            }
            Err(e) => {
                warn!("Thumbnail task for {key} panicked: {e}");
                report.failed += 1;
                continue;
            }
        };

        store
            .put(&buckets.thumbnails, &key, Bytes::from(thumbnail), "image/jpeg")
            .await?;
        report.created += 1;
    }

    info!("Thumbnail backfill done: {report:?}");
    Ok(report)
}
