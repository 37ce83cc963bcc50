//! Trend-convergence signal: fast EWM minus slow EWM of the value series.
//!
//! Smoothing is given as centre of mass (12 and 26 by default), not span.

use super::ema::Ewm;
use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ewm,
    slow: Ewm,
}

impl Macd {
    pub fn new(fast_com: f64, slow_com: f64) -> Self {
        Self {
            fast: Ewm::from_com(fast_com),
            slow: Ewm::from_com(slow_com),
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12.0, 26.0)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        "MACD"
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
        let fast = self.fast.mean(&values);
        let slow = self.slow.mean(&values);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}
