//! Liveness probe: `GET /health`.
//!
//! Always healthy while the process serves requests; absent models are not
//! reported here.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serialization() {
        let json = serde_json::to_string(&HealthResponse { status: "healthy" }).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }
}
