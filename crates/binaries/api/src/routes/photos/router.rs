use crate::api_state::ApiState;
use crate::photos::handlers::{delete_photo, list_photos, update_photos, upload_photos};
use axum::Router;
use axum::routing::{delete, get, post};

pub fn photos_router() -> Router<ApiState> {
    Router::new()
        .route("/photos/upload", post(upload_photos))
        .route("/photos/update", post(update_photos))
        .route("/photos/list", get(list_photos))
        .route("/photos/delete", delete(delete_photo))
}
