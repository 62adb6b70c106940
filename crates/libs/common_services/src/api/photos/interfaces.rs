use common_types::PhotoMetadataPatch;
use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /photos/update`: photo id -> fields to change.
pub type UpdatePhotosRequest = BTreeMap<String, PhotoMetadataPatch>;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DeletePhotoParams {
    /// Id of the photo to delete.
    pub name: Option<String>,
}
