use crate::api::photos::service::PhotoService;
use crate::storage::{ETag, MemoryObjectStore, ObjectStore, StorageError, VersionedObject};
use app_state::{AcceptedFormat, BucketSettings, CATALOG_KEY, IngestSettings, ThumbnailSettings};
use async_trait::async_trait;
use axum::Router;
use axum::routing::get;
use bytes::Bytes;
use common_types::{Catalog, PhotoUploadRequest};
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// In-memory store that fails selected writes.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryObjectStore,
    pub fail_puts_to: Option<(&'static str, &'static str)>,
    pub fail_conditional_puts: bool,
}

fn injected() -> StorageError {
    StorageError::Backend("injected failure".to_string())
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn get_versioned(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<VersionedObject>, StorageError> {
        self.inner.get_versioned(bucket, key).await
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ETag, StorageError> {
        if self.fail_puts_to == Some((bucket, key)) {
            return Err(injected());
        }
        self.inner.put(bucket, key, body, content_type).await
    }

    async fn put_if_match(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
        expected: Option<&ETag>,
    ) -> Result<ETag, StorageError> {
        if self.fail_conditional_puts {
            return Err(injected());
        }
        self.inner
            .put_if_match(bucket, key, body, content_type, expected)
            .await
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.inner.delete(bucket, key).await
    }

    async fn list(&self, bucket: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list(bucket).await
    }
}

pub fn buckets() -> BucketSettings {
    BucketSettings {
        api: "api".to_string(),
        images: "images".to_string(),
        thumbnails: "thumbnails".to_string(),
    }
}

pub fn ingest_settings() -> IngestSettings {
    IngestSettings {
        canonical_mime_type: "image/jpeg".to_string(),
        accepted_formats: vec![
            AcceptedFormat {
                mime_type: "image/jpeg".to_string(),
                extensions: vec!["jpg".to_string(), "jpeg".to_string()],
            },
            AcceptedFormat {
                mime_type: "image/png".to_string(),
                extensions: vec!["png".to_string()],
            },
        ],
        thumbnail: ThumbnailSettings {
            width: 100,
            height: 100,
            quality: 85,
        },
        normalize_quality: 90,
    }
}

pub fn photo_service(store: Arc<dyn ObjectStore>) -> PhotoService {
    let http = crate::utils::http_client(Duration::from_secs(5)).unwrap();
    PhotoService::new(store, http, buckets(), ingest_settings())
}

pub async fn stored_catalog(store: &Arc<FlakyStore>) -> Catalog {
    let body = store.get("api", CATALOG_KEY).await.unwrap().unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x * 3) as u8, (y * 5) as u8, 90]));
    let mut out = Cursor::new(vec![]);
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| Rgba([0, 0, 255, (x * 6) as u8]));
    let mut out = Cursor::new(vec![]);
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Serves a few source images over http and returns the base url.
pub async fn serve_sources() -> String {
    let router = Router::new()
        .route("/a1.jpg", get(|| async { jpeg(64, 48) }))
        .route("/b2.jpg", get(|| async { jpeg(30, 90) }))
        .route("/logo.png", get(|| async { png(40, 20) }))
        .route("/broken.jpg", get(|| async { b"not really a jpeg".to_vec() }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await });
    format!("http://{addr}")
}

pub fn request(sources: &str, filename: &str, mime_type: &str, id: &str) -> PhotoUploadRequest {
    PhotoUploadRequest::builder()
        .source_url(format!("{sources}/{filename}"))
        .filename(filename)
        .mime_type(mime_type)
        .id(id)
        .build()
}
