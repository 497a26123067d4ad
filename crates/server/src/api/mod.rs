//! HTTP endpoint modules.
//!
//! Each sub-module owns a single responsibility area.
//! Shared error types live here in mod.rs.

mod health;
mod ingestion;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use batchgate_core::BatchGateError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a [`BatchGateError`] to an HTTP response.
pub(crate) fn error_response(e: BatchGateError) -> ApiError {
    debug!(error = %e, "request rejected");
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.public_message(),
        }),
    )
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::health;
pub use ingestion::{ingest, ingestion_status, ingestions_list};
