//! Technical indicators over a daily price series.
//!
//! Indicators are pure functions: bar history in, one numeric series out, same
//! length as the input. Warm-up rows are `f64::NAN`; the engine fills them
//! forward then backward so no feature column ever carries a gap.
//!
//! # Look-ahead contamination guard
//! No indicator value at row t may depend on price data from row t+1 or later.
//! Every indicator must pass the truncated-vs-full series test.

pub mod ema;
pub mod engine;
pub mod fill;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume_ratio;

pub use ema::{ewm_mean, Ewm};
pub use engine::IndicatorEngine;
pub use fill::{fill_forward, fill_forward_backward, finalize_column};
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volume_ratio::VolumeRatio;

use crate::domain::PriceBar;

/// A single feature column computed from the price series.
pub trait Indicator: Send + Sync {
    /// Column name in the feature frame (e.g. "SMA_20", "RSI").
    fn name(&self) -> &str;

    /// Compute the indicator for the entire series. Output length equals
    /// `bars.len()`; warm-up rows are NaN.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;

    /// Value used when the series is too short to produce any output.
    fn neutral(&self) -> f64 {
        0.0
    }
}

/// Create synthetic bars from close values for testing.
///
/// volume = 1000 for every row.
#[cfg(test)]
pub fn make_bars(values: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| PriceBar {
            date: base_date + chrono::Duration::days(i as i64),
            open: value,
            high: value + 1.0,
            low: value - 1.0,
            value,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
