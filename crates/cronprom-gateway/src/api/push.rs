use axum::{body::Bytes, extract::State, Json};
use serde_json::{json, Value};

use cronprom_core::error::CronPromError;
use cronprom_core::MetricUpdate;

use super::ApiError;
use crate::app_state::AppState;

/// Body is parsed here rather than by the `Json` extractor so malformed input
/// gets the same error envelope as every other rejection.
pub async fn push(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let update: MetricUpdate = serde_json::from_slice(&body)
        .map_err(|e| CronPromError::BadRequest(format!("error parsing JSON: {e}")))?;

    tracing::debug!(
        metric = %update.name,
        kind = %update.kind,
        value = update.value,
        "metric update received"
    );

    let name = update.name.clone();
    if let Err(e) = state.collector().apply(update) {
        tracing::warn!(metric = %name, error = %e, "metric update rejected");
        return Err(e.into());
    }

    Ok(Json(json!({ "status": "success" })))
}
