//! Data provider traits and structured error types.
//!
//! Market and macro providers sit behind traits so the orchestrator can be
//! driven by live HTTP clients in production and by fixtures in tests.

use crate::domain::{PriceBar, ReferenceSeries};
use chrono::NaiveDate;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Every variant is fatal to the forecast request that triggered it; the
/// message is what the caller sees.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("{provider} did not respond within {secs}s")]
    Timeout { provider: String, secs: u64 },

    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("series '{series_id}' has no observations in the requested window")]
    SeriesEmpty { series_id: String },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("export error: {0}")]
    ExportError(String),
}

impl DataError {
    /// Classify a transport-level reqwest failure.
    pub(crate) fn from_transport(provider: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout {
                provider: provider.to_string(),
                secs: timeout_secs,
            }
        } else if let Some(status) = err.status() {
            DataError::HttpStatus {
                provider: provider.to_string(),
                status: status.as_u16(),
            }
        } else {
            DataError::NetworkUnreachable(format!("{provider}: {err}"))
        }
    }
}

/// Source of daily price bars (market index, tickers).
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over an inclusive date range.
    fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, DataError>;
}

/// Source of macro-economic series keyed by series identifier.
pub trait MacroDataProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch observations of `series_id` over an inclusive date range.
    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        api_key: &str,
    ) -> Result<ReferenceSeries, DataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_human_readable() {
        let err = DataError::Timeout {
            provider: "fred".into(),
            secs: 10,
        };
        assert_eq!(err.to_string(), "fred did not respond within 10s");

        let err = DataError::SeriesEmpty {
            series_id: "GDP".into(),
        };
        assert!(err.to_string().contains("GDP"));
    }
}
