//! HTTP router construction.
//!
//! Assembles all Axum routes and middleware into a single `Router`.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/ingest", post(api::ingest))
        .route("/status/{id}", get(api::ingestion_status))
        .route("/ingestions", get(api::ingestions_list))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
