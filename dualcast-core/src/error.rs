//! Request-level errors: anything here fails the whole forecast request.
//!
//! Model failures are not in this list; adapters turn them into fallbacks.

use crate::data::DataError;

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no FRED API key in request or configuration")]
    MissingApiKey,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("no historical rows to forecast from")]
    EmptyHistory,

    #[error("response encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ForecastError {
    /// Caller-side problems, as opposed to upstream or internal failures.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::InvalidInput(_) | ForecastError::EmptyHistory
        )
    }
}
