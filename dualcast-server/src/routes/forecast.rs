//! Forecast endpoint: `POST /predictor`.
//!
//! Success is 200 with the double-encoded `[economic_json, merged_json]`
//! array. A malformed body or invalid bars is 400; any other pipeline
//! failure is 500. Model failures never reach this layer.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use dualcast_core::ForecastRequest;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<ForecastRequest>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    info!(
        symbol = request.symbol.as_deref().unwrap_or("-"),
        bars = request.current_data.len(),
        "forecast requested"
    );

    let service = Arc::clone(&state.forecast);
    let as_of = Utc::now().date_naive();
    let response = tokio::task::spawn_blocking(move || service.forecast(&request, as_of))
        .await
        .map_err(|e| AppError::Internal(format!("forecast task failed: {e}")))?
        .map_err(|e| {
            error!(error = %e, "forecast failed");
            AppError::from(e)
        })?;

    Ok(Json(response.to_wire()?))
}
