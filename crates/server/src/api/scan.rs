use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use cellscope_compute::ScanReport;
use cellscope_core::BatteryPackSnapshot;
use cellscope_ingest::{TelemetrySource, DEFAULT_VEHICLE};

use crate::state::AppState;

use super::{api_error, require_known_vehicle, ApiError};

#[derive(Debug, Deserialize)]
pub struct ScanParams {
    pub vehicle: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub vehicle: String,
    pub snapshot: BatteryPackSnapshot,
    pub report: ScanReport,
}

/// Take one simulated snapshot and diagnose it. Nothing is persisted.
pub async fn scan(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScanParams>,
) -> Result<Json<ScanResponse>, ApiError> {
    let vehicle = params.vehicle.unwrap_or_else(|| DEFAULT_VEHICLE.to_string());
    require_known_vehicle(&vehicle)?;

    let snapshot = state.generator.lock().await.next_snapshot();
    let report = state
        .engine
        .lock()
        .await
        .analyze(&snapshot)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(
        vehicle = %vehicle,
        anomalies = report.anomaly_count(),
        verdict = %report.verdict,
        "scan complete"
    );

    Ok(Json(ScanResponse {
        vehicle,
        snapshot,
        report,
    }))
}
