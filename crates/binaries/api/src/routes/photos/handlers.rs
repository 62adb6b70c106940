use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use common_services::api::photos::error::PhotosError;
use common_services::api::photos::interfaces::{DeletePhotoParams, UpdatePhotosRequest};
use common_services::api::photos::service::PhotoService;
use common_types::{PhotoMetadataPatch, PhotoSummary, PhotoUploadRequest};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Download, convert and store a batch of photos.
///
/// The batch is all-or-nothing: when any photo fails, every photo of the batch is removed
/// from the image and thumbnail buckets again.
///
/// # Errors
///
/// Returns 400 for a malformed batch, an unsupported media type or a missing id, and 500 when
/// a download, conversion or storage call fails.
#[utoipa::path(
    post,
    path = "/photos/upload",
    tag = "Photos",
    request_body = Vec<PhotoUploadRequest>,
    responses(
        (status = 200, description = "The stored batch, as submitted.", body = Vec<PhotoUploadRequest>),
        (status = 400, description = "The batch failed validation."),
        (status = 500, description = "Processing failed, the batch was rolled back."),
    )
)]
pub async fn upload_photos(
    State(service): State<PhotoService>,
    body: Result<Json<Vec<PhotoUploadRequest>>, JsonRejection>,
) -> Result<Json<Vec<PhotoUploadRequest>>, PhotosError> {
    let Json(batch) = body.map_err(|e| PhotosError::InvalidBody(e.body_text()))?;
    Ok(Json(service.ingest(batch).await?))
}

/// Change catalog metadata of photos, field by field.
///
/// # Errors
///
/// Returns 400 for a malformed body or an invalid id, 500 when the catalog can't be written.
#[utoipa::path(
    post,
    path = "/photos/update",
    tag = "Photos",
    request_body = BTreeMap<String, PhotoMetadataPatch>,
    responses(
        (status = 200, description = "The applied patches.", body = BTreeMap<String, PhotoMetadataPatch>),
        (status = 400, description = "The body failed validation."),
        (status = 500, description = "A storage error occurred."),
    )
)]
pub async fn update_photos(
    State(service): State<PhotoService>,
    body: Result<Json<UpdatePhotosRequest>, JsonRejection>,
) -> Result<Json<UpdatePhotosRequest>, PhotosError> {
    let Json(patches) = body.map_err(|e| PhotosError::InvalidBody(e.body_text()))?;
    Ok(Json(service.update(patches).await?))
}

/// List every thumbnail with its metadata.
///
/// # Errors
///
/// Returns a `PhotosError` if the store can't be read.
#[utoipa::path(
    get,
    path = "/photos/list",
    tag = "Photos",
    responses(
        (status = 200, description = "All photos that have a thumbnail.", body = Vec<PhotoSummary>),
        (status = 500, description = "A storage error occurred."),
    )
)]
pub async fn list_photos(
    State(service): State<PhotoService>,
) -> Result<Json<Vec<PhotoSummary>>, PhotosError> {
    Ok(Json(service.list().await?))
}

/// Delete a photo, its thumbnail and its catalog entry.
///
/// # Errors
///
/// Returns 400 if `name` is missing or not a valid id, 500 on a storage error.
#[utoipa::path(
    delete,
    path = "/photos/delete",
    tag = "Photos",
    params(DeletePhotoParams),
    responses(
        (status = 200, description = "The photo is gone.", body = Value, example = json!({"deleted": "a1"})),
        (status = 400, description = "No valid name given."),
        (status = 500, description = "A storage error occurred."),
    )
)]
pub async fn delete_photo(
    State(service): State<PhotoService>,
    Query(params): Query<DeletePhotoParams>,
) -> Result<Json<Value>, PhotosError> {
    let name = params
        .name
        .filter(|name| !name.is_empty())
        .ok_or(PhotosError::MissingName)?;
    service.delete(&name).await?;
    Ok(Json(json!({ "deleted": name })))
}
