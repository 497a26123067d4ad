//! Handlers for submitting ingestions and reading their status.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use batchgate_core::BatchGateError;
use batchgate_engine::{IngestRequest, IngestionSnapshot, IngestionSummary};

use super::{error_response, ApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ingestion_id: String,
}

/// POST /ingest: split the ids into batches and start processing.
///
/// Returns as soon as the ingestion is recorded; processing continues in
/// the background.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "malformed ingest body");
        error_response(BatchGateError::InvalidInput(rejection.body_text()))
    })?;

    let ingestion_id = state
        .scheduler
        .submit_request(request)
        .map_err(error_response)?;

    Ok(Json(IngestResponse {
        ingestion_id: ingestion_id.to_string(),
    }))
}

/// GET /status/{id}: aggregate status plus every batch, in order.
pub async fn ingestion_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<IngestionSnapshot>, ApiError> {
    state.scheduler.query(&id).map(Json).map_err(error_response)
}

/// GET /ingestions: every known ingestion, oldest first.
pub async fn ingestions_list(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<Vec<IngestionSummary>>) {
    (StatusCode::OK, Json(state.scheduler.list()))
}
