use axum::Json;
use serde_json::{Value, json};

/// Liveness check.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Band Site",
    responses(
        (status = 200, description = "The api is up.", body = Value, example = json!({"health": "healthy"})),
    )
)]
pub async fn health() -> Json<Value> {
    Json(json!({ "health": "healthy" }))
}
