//! Handler errors and their HTTP mapping.
//!
//! The body is always `{"error": message}`; only the status varies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dualcast_core::ForecastError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed body or invalid request data (400).
    #[error("{0}")]
    BadRequest(String),

    /// Pipeline failure (500).
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = axum::Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use dualcast_core::data::DataError;

    #[test]
    fn invalid_input_is_bad_request() {
        let err = AppError::from(ForecastError::InvalidInput("current_data is empty".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("current_data is empty"));
    }

    #[test]
    fn fetch_failure_is_internal() {
        let err = AppError::from(ForecastError::Data(DataError::NetworkUnreachable("fred".into())));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_key_is_internal() {
        assert_eq!(
            AppError::from(ForecastError::MissingApiKey).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
