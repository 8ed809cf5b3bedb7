use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::streams::use_cases::append_event::inbound::http as append_http;
use crate::shell::state::AppState;

pub async fn liveness() -> &'static str {
    "The service is online\n"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(liveness).post(append_http::handle_missing_stream),
        )
        .route("/{stream_id}", post(append_http::handle_next))
        .route("/{stream_id}/{version}", post(append_http::handle_at))
        .with_state(state)
}
