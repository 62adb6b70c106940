use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use common_services::api::requests::error::RequestsError;
use common_services::api::requests::service::RequestsService;
use common_types::SongRequest;

/// Request a song. Each session may send one request per cooldown period.
///
/// # Errors
///
/// Returns 400 if song or artist is missing, 403 if the session is still cooling down and
/// 500 if the request can't be stored or forwarded.
#[utoipa::path(
    post,
    path = "/request",
    tag = "Requests",
    request_body = SongRequest,
    responses(
        (status = 200, description = "The accepted request.", body = SongRequest),
        (status = 400, description = "Song and artist are required."),
        (status = 403, description = "This session already made a request recently."),
        (status = 500, description = "Storing or forwarding the request failed."),
    )
)]
pub async fn submit_request(
    State(service): State<RequestsService>,
    body: Result<Json<SongRequest>, JsonRejection>,
) -> Result<Json<SongRequest>, RequestsError> {
    let Json(request) = body.map_err(|e| RequestsError::InvalidBody(e.body_text()))?;
    Ok(Json(service.submit(request).await?))
}

/// All song requests received so far.
///
/// # Errors
///
/// Returns a `RequestsError` if the stored requests can't be read.
#[utoipa::path(
    get,
    path = "/requests",
    tag = "Requests",
    responses(
        (status = 200, description = "Stored song requests, oldest first.", body = Vec<SongRequest>),
        (status = 500, description = "A storage error occurred."),
    )
)]
pub async fn list_requests(
    State(service): State<RequestsService>,
) -> Result<Json<Vec<SongRequest>>, RequestsError> {
    Ok(Json(service.list().await?))
}
