pub mod photos;
pub mod requests;
pub mod root;

use crate::api_state::ApiState;
use crate::photos::router::photos_router;
use crate::requests::router::requests_router;
use crate::root::router::root_public_router;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::{LatencyUnit, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Upload batches carry urls, not image bytes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

// --- API Documentation ---
#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::health,
        // Photos handlers
        photos::handlers::upload_photos,
        photos::handlers::update_photos,
        photos::handlers::list_photos,
        photos::handlers::delete_photo,
        // Requests handlers
        requests::handlers::submit_request,
        requests::handlers::list_requests,
    ),
    components(
        schemas(
            common_types::PhotoMetadata,
            common_types::PhotoMetadataPatch,
            common_types::PhotoUploadRequest,
            common_types::PhotoSummary,
            common_types::LocationCandidate,
            common_types::SongRequest,
        ),
    ),
    tags(
        (name = "Band Site", description = "Band site backend API"),
        (name = "Photos", description = "Uploading, listing and managing gallery photos"),
        (name = "Requests", description = "Song requests from visitors")
    )
)]
struct ApiDoc;

// --- Router Construction ---
pub fn create_router(state: ApiState) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .merge(Scalar::with_url("/docs", openapi))
        .merge(root_public_router())
        .merge(photos_router())
        .merge(requests_router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            TraceLayer::new_for_http().on_response(
                tower_http::trace::DefaultOnResponse::new()
                    .level(tracing::Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
        )
}
