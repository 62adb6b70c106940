use crate::api_state::ApiState;
use crate::requests::handlers::{list_requests, submit_request};
use axum::Router;
use axum::routing::{get, post};

pub fn requests_router() -> Router<ApiState> {
    Router::new()
        .route("/request", post(submit_request))
        .route("/requests", get(list_requests))
}
