//! FRED (St. Louis Fed) macro-economic series provider.
//!
//! `GET {base}/fred/series/observations?series_id=..&file_type=json`.
//! Observation values arrive as strings; FRED marks missing values with "."
//! and those rows are dropped.

use super::provider::{DataError, MacroDataProvider};
use crate::domain::{Observation, ReferenceSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<RawObservation>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

pub struct FredProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout: Duration,
}

impl FredProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn parse_observations(
        series_id: &str,
        resp: ObservationsResponse,
    ) -> Result<ReferenceSeries, DataError> {
        if let Some(message) = resp.error_message {
            return Err(DataError::ResponseFormatChanged(format!("{series_id}: {message}")));
        }
        let raw = resp.observations.ok_or_else(|| {
            DataError::ResponseFormatChanged(format!("{series_id}: no observations field"))
        })?;

        let mut observations = Vec::with_capacity(raw.len());
        for row in raw {
            let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
                DataError::ResponseFormatChanged(format!("{series_id}: bad date '{}': {e}", row.date))
            })?;
            // Non-numeric values ("." for missing) are dropped.
            let Ok(value) = row.value.trim().parse::<f64>() else {
                continue;
            };
            if value.is_finite() {
                observations.push(Observation { date, value });
            }
        }

        if observations.is_empty() {
            return Err(DataError::SeriesEmpty {
                series_id: series_id.to_string(),
            });
        }

        Ok(ReferenceSeries::new(series_id, observations))
    }
}

impl MacroDataProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch_series(
        &self,
        series_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        api_key: &str,
    ) -> Result<ReferenceSeries, DataError> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        let secs = self.timeout.as_secs();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
            ])
            .send()
            .map_err(|e| DataError::from_transport(self.name(), secs, e))?;

        let status = resp.status();
        let body: ObservationsResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse {series_id} observations: {e}"))
        })?;

        if !status.is_success() {
            let detail = body
                .error_message
                .unwrap_or_else(|| format!("HTTP {status}"));
            if status == reqwest::StatusCode::BAD_REQUEST && detail.contains("api_key") {
                return Err(DataError::AuthenticationRequired(detail));
            }
            return Err(DataError::ResponseFormatChanged(format!("{series_id}: {detail}")));
        }

        Self::parse_observations(series_id, body)
    }
}
