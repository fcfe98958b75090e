//! HTTP handlers, one module per resource.
//!
//! Shared error body and rejection helpers live here in mod.rs.

mod config;
mod genai;
mod health;
mod history;
mod scan;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            detail: None,
        }),
    )
}

/// Reject vehicles outside the supported list.
pub(crate) fn require_known_vehicle(vehicle: &str) -> Result<(), ApiError> {
    if cellscope_ingest::is_known_vehicle(vehicle) {
        Ok(())
    } else {
        Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("unknown vehicle: '{vehicle}'"),
        ))
    }
}

pub async fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not found")
}

// ── Re-exports ───────────────────────────────────────────────────

pub use config::config;
pub use genai::genai;
pub use health::health;
pub use history::{history_clear, history_list, history_save};
pub use scan::scan;
