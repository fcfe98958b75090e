use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use cellscope_core::Config;

use crate::state::AppState;

/// Active config without secrets, plus the profiles visible in the environment.
pub async fn config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "config": state.config.redacted_summary(),
        "profiles": Config::available_profiles(),
    }))
}
