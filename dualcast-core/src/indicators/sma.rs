//! Simple Moving Average over a trailing window, expanding during warm-up.
//!
//! Row i averages `values[max(0, i+1-period)..=i]`, so the first row is its own
//! mean and there is no NaN prefix.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("SMA_{period}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
        rolling_mean(&values, self.period, 1)
    }
}

/// Trailing mean over up to `window` rows; rows with fewer than `min_periods`
/// observations are NaN.
pub(crate) fn rolling_mean(values: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let mut sum = 0.0;
    for i in 0..values.len() {
        sum += values[i];
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        if count >= min_periods {
            result[i] = sum / count as f64;
        }
    }
    result
}
