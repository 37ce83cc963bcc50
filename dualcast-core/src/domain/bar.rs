//! Price bars and single-series observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar after canonicalisation.
///
/// `value` is the closing price under its canonical name; every downstream
/// stage reads the target from here. Missing provider fields are already 0.0,
/// never NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub value: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar carrying only a closing value (OHLV zeroed).
    pub fn from_value(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            open: 0.0,
            high: 0.0,
            low: 0.0,
            value,
            volume: 0.0,
        }
    }

    /// Project the bar onto a single-series observation for `group`.
    pub fn to_point(&self, group: &str) -> TimeSeriesPoint {
        TimeSeriesPoint {
            date: self.date,
            value: self.value,
            group: group.to_string(),
        }
    }
}

/// One observation of a tracked quantity for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub group: String,
}
