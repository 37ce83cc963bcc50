//! Economic context: the reference series joined onto every forecast request.
//!
//! Macro series come from FRED, the market-index series from daily bars
//! down-sampled to one observation per month. Acquisition is all-or-nothing:
//! alignment is only meaningful with every declared series present, so the
//! first failing fetch aborts the request.

use super::provider::{DataError, MacroDataProvider, MarketDataProvider};
use crate::domain::{Observation, PriceBar, ReferenceSeries};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Where a reference series is fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    Fred,
    MarketIndex,
}

/// A declared reference series and the feature column it becomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSpec {
    /// Provider identifier, also the series name (`GDP`, `CPIAUCSL`, `SPY`).
    pub series_id: String,
    pub source: SeriesSource,
    /// Feature column name in the aligned frame.
    pub column: String,
    /// Values are divided by this before joining.
    #[serde(default = "default_divisor")]
    pub divisor: f64,
}

fn default_divisor() -> f64 {
    1.0
}

impl ReferenceSpec {
    pub fn new(series_id: &str, source: SeriesSource, column: &str, divisor: f64) -> Self {
        Self {
            series_id: series_id.to_string(),
            source,
            column: column.to_string(),
            divisor,
        }
    }

    /// GDP (scaled down by 50), CPI, and the SPY market index.
    pub fn defaults() -> Vec<ReferenceSpec> {
        vec![
            ReferenceSpec::new("GDP", SeriesSource::Fred, "gdp", 50.0),
            ReferenceSpec::new("CPIAUCSL", SeriesSource::Fred, "cpi", 1.0),
            ReferenceSpec::new("SPY", SeriesSource::MarketIndex, "spy", 1.0),
        ]
    }
}

/// The reference series fetched for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EconomicContext {
    pub series: Vec<ReferenceSeries>,
}

impl EconomicContext {
    pub fn new(series: Vec<ReferenceSeries>) -> Self {
        Self { series }
    }

    pub fn get(&self, name: &str) -> Option<&ReferenceSeries> {
        self.series.iter().find(|s| s.name() == name)
    }

    /// Outer join of every series on date, each column forward- then
    /// backward-filled. Row shape: `{date, <series_id>: value, ...}`.
    pub fn to_table(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        let dates: Vec<NaiveDate> = self
            .series
            .iter()
            .flat_map(|s| s.observations().iter().map(|o| o.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns: Vec<(&str, Vec<Option<f64>>)> = self
            .series
            .iter()
            .map(|s| {
                let mut exact: Vec<Option<f64>> = vec![None; dates.len()];
                for obs in s.observations() {
                    if let Ok(i) = dates.binary_search(&obs.date) {
                        exact[i] = Some(obs.value);
                    }
                }
                (s.name(), fill_options(exact))
            })
            .collect();

        dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let mut row = serde_json::Map::new();
                row.insert("date".into(), date.format("%Y-%m-%d").to_string().into());
                for (name, values) in &columns {
                    let value = values[i]
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null);
                    row.insert((*name).to_string(), value);
                }
                row
            })
            .collect()
    }
}

/// Forward-fill then backward-fill a column of optional values.
fn fill_options(mut values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    let mut last = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => last = Some(*x),
            None => *v = last,
        }
    }
    let mut next = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(x) => next = Some(*x),
            None => *v = next,
        }
    }
    values
}

/// First close of each calendar month, dated at the trading day it was observed.
pub fn monthly_first(name: &str, bars: &[PriceBar]) -> ReferenceSeries {
    let mut sorted: Vec<&PriceBar> = bars.iter().collect();
    sorted.sort_by_key(|b| b.date);

    let mut observations: Vec<Observation> = Vec::new();
    for bar in sorted {
        let same_month = observations
            .last()
            .is_some_and(|o| o.date.year() == bar.date.year() && o.date.month() == bar.date.month());
        if !same_month {
            observations.push(Observation {
                date: bar.date,
                value: bar.value,
            });
        }
    }
    ReferenceSeries::new(name, observations)
}

/// Anything that can produce the economic context for a request.
pub trait EconomicSource: Send + Sync {
    fn fetch_context(&self, as_of: NaiveDate, api_key: &str) -> Result<EconomicContext, DataError>;
}

/// Live source backed by a macro provider (FRED) and a market provider (Yahoo).
pub struct LiveEconomicSource {
    macro_provider: Box<dyn MacroDataProvider>,
    market_provider: Box<dyn MarketDataProvider>,
    references: Vec<ReferenceSpec>,
    lookback_days: i64,
}

impl LiveEconomicSource {
    pub fn new(
        macro_provider: Box<dyn MacroDataProvider>,
        market_provider: Box<dyn MarketDataProvider>,
        references: Vec<ReferenceSpec>,
        lookback_days: i64,
    ) -> Self {
        Self {
            macro_provider,
            market_provider,
            references,
            lookback_days,
        }
    }
}

impl EconomicSource for LiveEconomicSource {
    fn fetch_context(&self, as_of: NaiveDate, api_key: &str) -> Result<EconomicContext, DataError> {
        let start = as_of - chrono::Duration::days(self.lookback_days);
        let mut series = Vec::with_capacity(self.references.len());

        for spec in &self.references {
            let fetched = match spec.source {
                SeriesSource::Fred => {
                    self.macro_provider
                        .fetch_series(&spec.series_id, start, as_of, api_key)?
                }
                SeriesSource::MarketIndex => {
                    let bars = self.market_provider.fetch_daily(&spec.series_id, start, as_of)?;
                    monthly_first(&spec.series_id, &bars)
                }
            };
            if fetched.is_empty() {
                return Err(DataError::SeriesEmpty {
                    series_id: spec.series_id.clone(),
                });
            }
            debug!(series = %spec.series_id, observations = fetched.len(), "reference series fetched");
            series.push(fetched);
        }

        info!(series = series.len(), %start, end = %as_of, "economic context ready");
        Ok(EconomicContext::new(series))
    }
}
