use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use cellscope_core::{BatteryPackSnapshot, CellscopeError};
use cellscope_storage::ScanHistoryItem;

use crate::state::AppState;

use super::{api_error, require_known_vehicle, ApiError};

#[derive(Debug, Deserialize)]
pub struct SaveScanRequest {
    pub vehicle: String,
    pub data: BatteryPackSnapshot,
}

pub async fn history_list(State(state): State<Arc<AppState>>) -> Json<Vec<ScanHistoryItem>> {
    Json(state.history.lock().await.list())
}

/// Diagnose the submitted snapshot, prepend it to history, return the new list.
pub async fn history_save(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveScanRequest>,
) -> Result<Json<Vec<ScanHistoryItem>>, ApiError> {
    require_known_vehicle(&req.vehicle)?;

    let report = state
        .engine
        .lock()
        .await
        .analyze(&req.data)
        .map_err(|e| match e {
            CellscopeError::InvalidInput(msg) => api_error(StatusCode::BAD_REQUEST, msg),
            other => api_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        })?;

    let item = ScanHistoryItem::new(
        req.vehicle,
        req.data,
        report.verdict,
        report.anomaly_count(),
        Utc::now(),
    );
    let id = item.id.clone();

    let items = state.history.lock().await.save(item).map_err(|e| {
        warn!("Failed to save scan history: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(id = %id, entries = items.len(), "scan saved to history");
    Ok(Json(items))
}

pub async fn history_clear(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.history.lock().await.clear().map_err(|e| {
        warn!("Failed to clear scan history: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    info!("scan history cleared");
    Ok(StatusCode::NO_CONTENT)
}
