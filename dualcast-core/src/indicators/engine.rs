//! Runs a set of indicators over one price series and finalises the columns.

use super::fill::finalize_column;
use super::{Indicator, Macd, Rsi, Sma, VolumeRatio};
use crate::domain::PriceBar;
use crate::features::FeatureColumn;
use std::fmt;

pub struct IndicatorEngine {
    indicators: Vec<Box<dyn Indicator>>,
}

impl IndicatorEngine {
    pub fn new(indicators: Vec<Box<dyn Indicator>>) -> Self {
        Self { indicators }
    }

    pub fn names(&self) -> Vec<&str> {
        self.indicators.iter().map(|i| i.name()).collect()
    }

    /// One column per indicator, in registration order, each the length of
    /// `bars` and free of NaN.
    pub fn compute(&self, bars: &[PriceBar]) -> Vec<FeatureColumn> {
        self.indicators
            .iter()
            .map(|indicator| {
                let raw = indicator.compute(bars);
                debug_assert_eq!(raw.len(), bars.len(), "{}: length mismatch", indicator.name());
                FeatureColumn::new(indicator.name(), finalize_column(raw, indicator.neutral()))
            })
            .collect()
    }
}

impl Default for IndicatorEngine {
    /// SMA_20, RSI (14), MACD (com 12/26), Volume_Ratio (10).
    fn default() -> Self {
        Self::new(vec![
            Box::new(Sma::new(20)),
            Box::new(Rsi::new(14)),
            Box::new(Macd::default()),
            Box::new(VolumeRatio::new(10)),
        ])
    }
}

impl fmt::Debug for IndicatorEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorEngine")
            .field("indicators", &self.names())
            .finish()
    }
}
