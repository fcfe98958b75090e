//! `/api/genai`: keeps the Gemini key server-side for browser clients.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::state::AppState;

use super::{api_error, ApiError, ErrorResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenaiRequest {
    pub prompt: String,
    #[serde(default)]
    pub system_instruction: Option<String>,
}

fn proxy_error(detail: impl ToString) -> ApiError {
    let detail = detail.to_string();
    warn!("genai proxy error: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "proxy error".into(),
            detail: Some(detail),
        }),
    )
}

/// Relay the upstream status and body unchanged.
///
/// The body is read as JSON whatever the Content-Type; an empty body counts
/// as `{}`. Unparsable bodies are reported as proxy errors.
pub async fn genai(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let raw: Value = if body.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(&body).map_err(proxy_error)?
    };

    if !state.genai.is_configured() {
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server not configured with GEMINI_API_KEY",
        ));
    }

    let req: GenaiRequest = serde_json::from_value(raw).map_err(proxy_error)?;
    let reply = state
        .genai
        .forward(&req.prompt, req.system_instruction.as_deref())
        .await
        .map_err(proxy_error)?;

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)))
}
