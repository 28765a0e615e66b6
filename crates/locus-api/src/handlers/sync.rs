//! Remote library sync trigger.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /sync
///
/// Runs one reconcile cycle and reports the new watermark.
pub async fn trigger_sync(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let version = state.sync.sync().await?;
    Ok(Json(json!({ "version": version })))
}
