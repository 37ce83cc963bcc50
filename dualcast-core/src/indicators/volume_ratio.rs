//! Volume ratio: current volume over its trailing mean.
//!
//! The trailing mean needs a full window, so the first `period - 1` rows are
//! NaN. A zero trailing mean yields NaN rather than infinity. A series with no
//! volume at all (every row zero) is a constant 1.

use super::sma::rolling_mean;
use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct VolumeRatio {
    period: usize,
}

impl VolumeRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "volume ratio period must be >= 1");
        Self { period }
    }
}

impl Indicator for VolumeRatio {
    fn name(&self) -> &str {
        "Volume_Ratio"
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        if bars.iter().all(|b| b.volume == 0.0) {
            return vec![1.0; bars.len()];
        }
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let means = rolling_mean(&volumes, self.period, self.period);
        volumes
            .iter()
            .zip(&means)
            .map(|(&v, &m)| if m == 0.0 || m.is_nan() { f64::NAN } else { v / m })
            .collect()
    }

    fn neutral(&self) -> f64 {
        1.0
    }
}
