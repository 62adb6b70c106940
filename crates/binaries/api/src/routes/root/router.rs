use crate::api_state::ApiState;
use crate::root::handlers::health;
use axum::{Router, routing::get};

pub fn root_public_router() -> Router<ApiState> {
    Router::new().route("/health", get(health))
}
