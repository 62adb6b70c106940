use crate::api::photos::error::PhotosError;
use crate::api::photos::saga::Saga;
use crate::api::photos::service::PhotoService;
use crate::api::photos::step_policy::{IngestStep, StepPolicy};
use crate::storage::{Change, validate_key};
use app_state::IngestSettings;
use bytes::Bytes;
use color_eyre::eyre::eyre;
use common_types::{Catalog, PhotoMetadata, PhotoUploadRequest};
use futures_util::StreamExt;
use generate_thumbnails::{generate_thumbnail, normalize_to_jpeg};
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Applies the step's failure policy: best-effort failures become `None`.
fn settle<T>(
    step: IngestStep,
    id: &str,
    result: Result<T, PhotosError>,
) -> Result<Option<T>, PhotosError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => match step.policy() {
            StepPolicy::BestEffort => {
                warn!("Step '{step}' failed for {id:?}, continuing without it: {e}");
                Ok(None)
            }
            StepPolicy::Reject | StepPolicy::Fatal => {
                warn!("Step '{step}' failed for {id:?}: {e}");
                Err(e)
            }
        },
    }
}

/// Like [`settle`], for steps whose output the rest of the item cannot do without.
fn required<T>(
    step: IngestStep,
    id: &str,
    result: Result<T, PhotosError>,
) -> Result<T, PhotosError> {
    settle(step, id, result)?
        .ok_or_else(|| PhotosError::Internal(eyre!("step '{step}' was skipped but is required")))
}

async fn run_blocking<T: Send + 'static>(
    work: impl FnOnce() -> color_eyre::Result<T> + Send + 'static,
) -> Result<T, PhotosError> {
    tokio::task::spawn_blocking(work)
        .await?
        .map_err(PhotosError::Image)
}

impl PhotoService {
    /// Stores a batch of photos all-or-nothing and returns the batch as submitted.
    ///
    /// Ids and formats of the whole batch are checked first; a rejected batch touches
    /// nothing. Items are then processed in order. If any fatal step fails, including the
    /// final catalog merge, the image and thumbnail of every item in the batch are deleted
    /// again and the original error is returned.
    pub async fn ingest(
        &self,
        batch: Vec<PhotoUploadRequest>,
    ) -> Result<Vec<PhotoUploadRequest>, PhotosError> {
        info!("Ingesting batch of {} photos", batch.len());
        let plans = self.validate_batch(&batch)?;
        let mut saga = Saga::for_batch(&batch, &self.buckets);

        match self.run_batch(&batch, &plans, &mut saga).await {
            Ok(()) => {
                info!("Ingested {} photos", batch.len());
                Ok(batch)
            }
            Err(e) => {
                error!("Upload batch failed: {e}");
                saga.compensate(self.store.as_ref()).await;
                Err(e)
            }
        }
    }

    /// Returns, per item, whether it has to be normalized.
    fn validate_batch(&self, batch: &[PhotoUploadRequest]) -> Result<Vec<bool>, PhotosError> {
        batch
            .iter()
            .map(|item| {
                let id = item.id.as_str();
                let valid = validate_key(id).map_err(|_| PhotosError::InvalidId(id.to_string()));
                required(IngestStep::ValidateId, id, valid)?;
                required(IngestStep::CheckFormat, id, self.check_format(item))
            })
            .collect()
    }

    async fn run_batch(
        &self,
        batch: &[PhotoUploadRequest],
        plans: &[bool],
        saga: &mut Saga,
    ) -> Result<(), PhotosError> {
        let mut staged = Catalog::new();
        for (item, &needs_normalizing) in batch.iter().zip(plans) {
            let metadata = self.ingest_item(item, needs_normalizing, saga).await?;
            staged.insert(item.id.clone(), metadata);
        }

        let merged = self.merge_catalog(&staged).await;
        required(IngestStep::MergeCatalog, "<batch>", merged)
    }

    async fn ingest_item(
        &self,
        item: &PhotoUploadRequest,
        needs_normalizing: bool,
        saga: &mut Saga,
    ) -> Result<PhotoMetadata, PhotosError> {
        let id = item.id.as_str();

        let downloaded = self.download(&item.source_url).await;
        let source = required(IngestStep::Download, id, downloaded)?;

        let image = if needs_normalizing {
            let quality = self.ingest.normalize_quality;
            let normalized = run_blocking(move || normalize_to_jpeg(&source, quality)).await;
            Bytes::from(required(IngestStep::Normalize, id, normalized)?)
        } else {
            Bytes::from(source)
        };

        let thumbnail = {
            let image = image.clone();
            let options = self.thumb_options;
            run_blocking(move || generate_thumbnail(&image, &options)).await
        };
        let thumbnail = settle(IngestStep::Thumbnail, id, thumbnail)?;

        let images_bucket = &self.buckets.images;
        let uploaded = self
            .upload(images_bucket, id, image, &self.ingest.canonical_mime_type, saga)
            .await;
        required(IngestStep::UploadImage, id, uploaded)?;

        let thumbnails_bucket = &self.buckets.thumbnails;
        let uploaded = match thumbnail {
            Some(thumbnail) => {
                let body = Bytes::from(thumbnail);
                self.upload(thumbnails_bucket, id, body, THUMBNAIL_CONTENT_TYPE, saga)
                    .await
            }
            // A thumbnail of a previous upload under this id would no longer match.
            None => self
                .store
                .delete(thumbnails_bucket, id)
                .await
                .map_err(PhotosError::from),
        };
        required(IngestStep::UploadThumbnail, id, uploaded)?;

        let mut metadata = item.metadata.clone();
        metadata.filename = id.to_string();
        Ok(metadata)
    }

    /// Streams the source into a temp file and reads it back once complete.
    async fn download(&self, url: &str) -> Result<Vec<u8>, PhotosError> {
        let failed = |reason: String| PhotosError::Download {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("source responded with {status}")));
        }

        let temp = NamedTempFile::new().map_err(|e| failed(e.to_string()))?;
        let mut file = fs::File::create(temp.path())
            .await
            .map_err(|e| failed(e.to_string()))?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| failed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| failed(e.to_string()))?;
        }
        file.flush().await.map_err(|e| failed(e.to_string()))?;
        drop(file);

        fs::read(temp.path())
            .await
            .map_err(|e| failed(e.to_string()))
    }

    /// Returns whether the item has to be converted to the canonical format.
    fn check_format(&self, item: &PhotoUploadRequest) -> Result<bool, PhotosError> {
        let format = self
            .ingest
            .format_for_mime(&item.mime_type)
            .ok_or_else(|| PhotosError::UnsupportedMediaType(item.mime_type.clone()))?;
        if !IngestSettings::extension_matches(format, &item.filename) {
            return Err(PhotosError::InvalidExtension {
                filename: item.filename.clone(),
                mime_type: item.mime_type.clone(),
            });
        }
        Ok(!self.ingest.is_canonical(&item.mime_type))
    }

    async fn upload(
        &self,
        bucket: &str,
        id: &str,
        body: Bytes,
        content_type: &str,
        saga: &mut Saga,
    ) -> Result<(), PhotosError> {
        self.store.put(bucket, id, body, content_type).await?;
        saga.record_upload(bucket, id);
        Ok(())
    }

    /// Replaces the catalog entry of every staged id.
    async fn merge_catalog(&self, staged: &Catalog) -> Result<(), PhotosError> {
        self.catalog
            .update(|catalog| {
                for (id, metadata) in staged {
                    catalog.insert(id.clone(), metadata.clone());
                }
                Change::Commit(())
            })
            .await?;
        Ok(())
    }
}
