use crate::api::photos::error::PhotosError;
use crate::api::photos::interfaces::UpdatePhotosRequest;
use crate::storage::{Change, JsonDocument, ObjectStore, validate_key};
use app_state::{BucketSettings, CATALOG_KEY, IngestSettings};
use common_types::{Catalog, PhotoSummary};
use generate_thumbnails::ThumbOptions;
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// Photo catalog operations: listing, metadata edits, deletion and batch uploads.
#[derive(Clone)]
pub struct PhotoService {
    pub(super) store: Arc<dyn ObjectStore>,
    pub(super) buckets: BucketSettings,
    pub(super) catalog: JsonDocument<Catalog>,
    pub(super) http_client: Client,
    pub(super) ingest: IngestSettings,
    pub(super) thumb_options: ThumbOptions,
}

impl PhotoService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        http_client: Client,
        buckets: BucketSettings,
        ingest: IngestSettings,
    ) -> Self {
        let catalog = JsonDocument::new(store.clone(), buckets.api.clone(), CATALOG_KEY);
        let thumb_options = ThumbOptions::from(&ingest.thumbnail);
        Self {
            store,
            buckets,
            catalog,
            http_client,
            ingest,
            thumb_options,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &JsonDocument<Catalog> {
        &self.catalog
    }

    /// One summary per stored thumbnail, with its catalog metadata or defaults if the
    /// catalog has no entry for it.
    pub async fn list(&self) -> Result<Vec<PhotoSummary>, PhotosError> {
        let catalog = self.catalog.read().await?;
        let keys = self.store.list(&self.buckets.thumbnails).await?;

        let mut photos = Vec::with_capacity(keys.len());
        for id in keys {
            let Some(body) = self.store.get(&self.buckets.thumbnails, &id).await? else {
                debug!("Thumbnail {id} disappeared while listing");
                continue;
            };
            let metadata = catalog.get(&id).cloned().unwrap_or_default();
            photos.push(PhotoSummary {
                id,
                body: body.to_vec(),
                metadata,
            });
        }
        Ok(photos)
    }

    /// Merges each patch field-wise into its catalog entry, creating entries that don't exist.
    pub async fn update(
        &self,
        patches: UpdatePhotosRequest,
    ) -> Result<UpdatePhotosRequest, PhotosError> {
        if let Some(id) = patches.keys().find(|id| validate_key(id).is_err()) {
            return Err(PhotosError::InvalidId(id.clone()));
        }

        self.catalog
            .update(|catalog| {
                for (id, patch) in &patches {
                    catalog
                        .entry(id.clone())
                        .or_default()
                        .apply_patch(patch.clone());
                }
                Change::Commit(())
            })
            .await?;

        info!("Updated metadata of {} photos", patches.len());
        Ok(patches)
    }

    /// Deletes image, thumbnail and catalog entry, in that order. Stops at the first failure.
    pub async fn delete(&self, id: &str) -> Result<(), PhotosError> {
        if validate_key(id).is_err() {
            return Err(PhotosError::InvalidId(id.to_string()));
        }

        self.store.delete(&self.buckets.images, id).await?;
        self.store.delete(&self.buckets.thumbnails, id).await?;
        self.catalog
            .update(|catalog| match catalog.remove(id) {
                Some(_) => Change::Commit(()),
                None => Change::Discard(()),
            })
            .await?;

        info!("Deleted photo {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::photos::error::PhotosError;
    use crate::api::photos::test_support::{FlakyStore, photo_service, stored_catalog};
    use crate::storage::{ObjectStore, StorageError};
    use bytes::Bytes;
    use common_types::{PhotoMetadata, PhotoMetadataPatch};
    use serde_json::json;
    use std::sync::Arc;

    fn patch(value: serde_json::Value) -> PhotoMetadataPatch {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn update_merges_field_wise() -> color_eyre::Result<()> {
        let store = Arc::new(FlakyStore::default());
        let service = photo_service(store.clone());

        service
            .update(
                [(
                    "a1".to_string(),
                    patch(json!({ "category": "live", "tags": "drums" })),
                )]
                .into(),
            )
            .await?;
        let echoed = service
            .update([("a1".to_string(), patch(json!({ "tags": "guitar" })))].into())
            .await?;

        assert_eq!(echoed["a1"].tags.as_deref(), Some("guitar"));
        let catalog = stored_catalog(&store).await;
        assert_eq!(catalog["a1"].category, "live");
        assert_eq!(catalog["a1"].tags, "guitar");
        Ok(())
    }

    #[tokio::test]
    async fn list_returns_one_summary_per_thumbnail() -> color_eyre::Result<()> {
        let store = Arc::new(FlakyStore::default());
        let service = photo_service(store.clone());
        store
            .put("thumbnails", "a1", Bytes::from_static(b"thumb-a1"), "image/jpeg")
            .await?;
        store
            .put("thumbnails", "orphan", Bytes::from_static(b"thumb-orphan"), "image/jpeg")
            .await?;
        service
            .update(
                [(
                    "a1".to_string(),
                    patch(json!({ "filename": "a1", "category": "live" })),
                )]
                .into(),
            )
            .await?;
        service
            .update([("no-thumbnail".to_string(), patch(json!({ "filename": "x" })))].into())
            .await?;

        let photos = service.list().await?;

        let ids: Vec<_> = photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "orphan"]);
        assert_eq!(photos[0].body, b"thumb-a1");
        assert_eq!(photos[0].metadata.category, "live");
        assert_eq!(photos[1].metadata, PhotoMetadata::default());
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_everything_and_is_idempotent() -> color_eyre::Result<()> {
        let store = Arc::new(FlakyStore::default());
        let service = photo_service(store.clone());
        store.put("images", "a1", Bytes::from_static(b"img"), "image/jpeg").await?;
        store.put("thumbnails", "a1", Bytes::from_static(b"thumb"), "image/jpeg").await?;
        service
            .update([("a1".to_string(), patch(json!({ "filename": "a1" })))].into())
            .await?;

        service.delete("a1").await?;
        service.delete("a1").await?;

        assert!(store.list("images").await?.is_empty());
        assert!(store.list("thumbnails").await?.is_empty());
        assert!(stored_catalog(&store).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_stops_at_the_first_failure() -> color_eyre::Result<()> {
        let store = Arc::new(FlakyStore {
            fail_conditional_puts: true,
            ..FlakyStore::default()
        });
        let service = photo_service(store.clone());
        store.put("images", "a1", Bytes::from_static(b"img"), "image/jpeg").await?;
        store
            .put("api", "photos.json", Bytes::from_static(br#"{"a1":{}}"#), "application/json")
            .await?;

        let error = service.delete("a1").await.unwrap_err();

        assert!(matches!(error, PhotosError::Storage(StorageError::Backend(_))));
        assert!(store.list("images").await?.is_empty());
        assert!(stored_catalog(&store).await.contains_key("a1"));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_ids_that_are_not_object_keys() {
        let service = photo_service(Arc::new(FlakyStore::default()));
        assert!(matches!(service.delete("").await, Err(PhotosError::InvalidId(_))));
        assert!(matches!(
            service.delete("../photos.json").await,
            Err(PhotosError::InvalidId(_))
        ));
    }
}
