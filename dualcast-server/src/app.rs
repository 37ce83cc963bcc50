//! Axum application builder.
//!
//! Routes:
//! - `GET /health` - liveness probe
//! - `POST /predictor` - dual-model forecast
//! - `POST /analyze` - news sentiment and advice

use axum::routing::{get, post};
use axum::Router;
use dualcast_core::config::ServerSettings;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::{analyze, forecast, health};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health::health))
        .route("/predictor", post(forecast::predict))
        .route("/analyze", post(analyze::analyze))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn bind_addr(settings: &ServerSettings) -> String {
    format!("{}:{}", settings.host, settings.port)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, settings: &ServerSettings) -> std::io::Result<()> {
    let addr = bind_addr(settings);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, create_app(state)).await
}
