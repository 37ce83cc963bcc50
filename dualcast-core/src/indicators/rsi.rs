//! Relative Strength Index over simple trailing means of gains and losses.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! The first row has no prior close and counts as neither gain nor loss.
//! Means use up to `period` rows and need only one, so there is no warm-up.
//! When the average loss is zero the ratio is pinned to 1e10 and the
//! oscillator saturates just below 100.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::PriceBar;

const SATURATED_RATIO: f64 = 1e10;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        "RSI"
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let change = bars[i].value - bars[i - 1].value;
            if change > 0.0 {
                gains[i] = change;
            } else if change < 0.0 {
                losses[i] = -change;
            }
        }

        let avg_gain = rolling_mean(&gains, self.period, 1);
        let avg_loss = rolling_mean(&losses, self.period, 1);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                let ratio = if l == 0.0 { SATURATED_RATIO } else { g / l };
                100.0 - 100.0 / (1.0 + ratio)
            })
            .collect()
    }

    fn neutral(&self) -> f64 {
        50.0
    }
}
