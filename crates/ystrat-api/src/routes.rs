//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{analyze, get_strategy, health, list_strategies};
use crate::state::AppState;

/// Create the playground router.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/strategies", get(list_strategies))
        .route("/strategies/:id", get(get_strategy))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}
