//! Sentiment and advice endpoint: `POST /analyze`.
//!
//! Success is `{sentiment, advice}`. Every failure, including a malformed
//! body, is reported as `{"error": message}` with status 200.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub news: String,
}

pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Json<Value> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(e) => return error_body(e.body_text()),
    };

    let service = Arc::clone(&state.advice);
    let result = tokio::task::spawn_blocking(move || {
        service.analyze(request.stock.trim(), request.news.trim())
    })
    .await;

    match result {
        Ok(Ok(advice)) => match serde_json::to_value(advice) {
            Ok(body) => Json(body),
            Err(e) => error_body(e.to_string()),
        },
        Ok(Err(e)) => {
            warn!(error = %e, "analysis failed");
            error_body(e.to_string())
        }
        Err(e) => error_body(format!("analysis task failed: {e}")),
    }
}

fn error_body(message: String) -> Json<Value> {
    Json(json!({ "error": message }))
}
