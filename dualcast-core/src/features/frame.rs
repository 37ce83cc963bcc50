//! Per-group feature table: prices, aligned reference columns, indicators,
//! calendar fields and a dense position index.

use crate::data::{EconomicContext, SeriesAligner};
use crate::domain::{PriceBar, TimeSeriesPoint};
use crate::error::ForecastError;
use crate::indicators::{fill_forward, IndicatorEngine};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

/// A named numeric feature column, one value per frame row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureColumn {
    pub name: String,
    pub values: Vec<f64>,
}

impl FeatureColumn {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Rows sorted by date, unique dates, `time_idx` = 0, 1, 2, ... in row order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFrame {
    group: String,
    dates: Vec<NaiveDate>,
    value: Vec<f64>,
    columns: Vec<FeatureColumn>,
    time_idx: Vec<i64>,
}

impl FeatureFrame {
    /// Assemble a frame from already-ordered rows. `time_idx` is assigned here.
    fn from_parts(
        group: &str,
        dates: Vec<NaiveDate>,
        value: Vec<f64>,
        columns: Vec<FeatureColumn>,
    ) -> Self {
        let time_idx = (0..dates.len() as i64).collect();
        Self {
            group: group.to_string(),
            dates,
            value,
            columns,
            time_idx,
        }
    }

    /// Value-only frame: no indicators, no reference columns.
    pub fn univariate(group: &str, bars: &[PriceBar]) -> Self {
        let points: Vec<TimeSeriesPoint> = bars.iter().map(|b| b.to_point(group)).collect();
        Self::from_points(group, &points)
    }

    /// Value-only frame from one entity's observations, already in date order.
    pub fn from_points(group: &str, points: &[TimeSeriesPoint]) -> Self {
        Self::from_parts(
            group,
            points.iter().map(|p| p.date).collect(),
            points.iter().map(|p| p.value).collect(),
            Vec::new(),
        )
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.value
    }

    pub fn columns(&self) -> &[FeatureColumn] {
        &self.columns
    }

    pub fn time_idx(&self) -> &[i64] {
        &self.time_idx
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn month(&self, row: usize) -> u32 {
        self.dates[row].month()
    }

    pub fn year(&self, row: usize) -> i32 {
        self.dates[row].year()
    }

    /// Any real-valued feature by name: `value`, `time_idx`, `year`, `month`,
    /// or a named feature column.
    pub fn real(&self, name: &str) -> Option<Vec<f64>> {
        match name {
            "value" => Some(self.value.clone()),
            "time_idx" => Some(self.time_idx.iter().map(|&t| t as f64).collect()),
            "year" => Some(self.dates.iter().map(|d| d.year() as f64).collect()),
            "month" => Some(self.dates.iter().map(|d| d.month() as f64).collect()),
            other => self.column(other).map(<[f64]>::to_vec),
        }
    }

    /// Trailing `n` rows (all rows if fewer) with `time_idx` rebased to zero.
    pub fn tail(&self, n: usize) -> FeatureFrame {
        let start = self.len().saturating_sub(n);
        Self::from_parts(
            &self.group,
            self.dates[start..].to_vec(),
            self.value[start..].to_vec(),
            self.columns
                .iter()
                .map(|c| FeatureColumn::new(c.name.clone(), c.values[start..].to_vec()))
                .collect(),
        )
    }
}

/// Builds the context-rich frame: reference columns joined point-in-time,
/// then indicators over the value series.
#[derive(Debug)]
pub struct FeatureFrameBuilder {
    engine: IndicatorEngine,
    aligner: SeriesAligner,
}

impl FeatureFrameBuilder {
    pub fn new(engine: IndicatorEngine, aligner: SeriesAligner) -> Self {
        Self { engine, aligner }
    }

    /// `bars` must already be canonical (sorted, unique dates).
    pub fn build(
        &self,
        group: &str,
        bars: &[PriceBar],
        context: &EconomicContext,
    ) -> Result<FeatureFrame, ForecastError> {
        if bars.is_empty() {
            return Err(ForecastError::EmptyHistory);
        }
        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();

        let mut columns = Vec::new();
        for aligned in self.aligner.align(&dates, context) {
            // No row may read an observation dated after it.
            if !aligned.covers_start() {
                warn!(
                    column = %aligned.name,
                    first_price_date = %dates[0],
                    "reference starts after the first price date, column omitted"
                );
                continue;
            }
            let mut values: Vec<f64> = aligned
                .values
                .iter()
                .map(|v| v.unwrap_or(f64::NAN))
                .collect();
            fill_forward(&mut values);
            columns.push(FeatureColumn::new(aligned.name, values));
        }
        columns.extend(self.engine.compute(bars));

        debug!(
            group,
            rows = dates.len(),
            columns = columns.len(),
            "feature frame built"
        );
        Ok(FeatureFrame::from_parts(
            group,
            dates,
            bars.iter().map(|b| b.value).collect(),
            columns,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReferenceSpec;
    use crate::domain::{Observation, ReferenceSeries};
    use crate::indicators::make_bars;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn builder() -> FeatureFrameBuilder {
        FeatureFrameBuilder::new(
            IndicatorEngine::default(),
            SeriesAligner::new(ReferenceSpec::defaults()),
        )
    }

    #[test]
    fn time_idx_is_dense_from_zero() {
        let frame = FeatureFrame::univariate("AAPL", &make_bars(&[1.0, 2.0, 3.0]));
        assert_eq!(frame.time_idx(), &[0, 1, 2]);
    }

    #[test]
    fn tail_rebases_time_idx() {
        let frame = FeatureFrame::univariate("AAPL", &make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]));
        let tail = frame.tail(2);
        assert_eq!(tail.values(), &[4.0, 5.0]);
        assert_eq!(tail.time_idx(), &[0, 1]);
        assert_eq!(tail.last_date(), frame.last_date());
    }

    #[test]
    fn tail_longer_than_frame_keeps_all_rows() {
        let frame = FeatureFrame::univariate("AAPL", &make_bars(&[1.0, 2.0]));
        assert_eq!(frame.tail(100).len(), 2);
    }

    #[test]
    fn builder_omits_reference_starting_after_first_price() {
        // make_bars starts on 2024-01-02; CPI first observed 2024-01-04.
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let ctx = EconomicContext::new(vec![ReferenceSeries::new(
            "CPIAUCSL",
            vec![Observation {
                date: d("2024-01-04"),
                value: 300.0,
            }],
        )]);
        let frame = builder().build("AAPL", &bars, &ctx).unwrap();
        assert!(frame.column("cpi").is_none());
        assert!(frame.column("gdp").is_none());
        assert!(frame.column("SMA_20").is_some());
    }

    #[test]
    fn builder_keeps_reference_covering_first_price() {
        let bars = make_bars(&[10.0, 11.0, 12.0]);
        let ctx = EconomicContext::new(vec![ReferenceSeries::new(
            "CPIAUCSL",
            vec![
                Observation {
                    date: d("2024-01-01"),
                    value: 300.0,
                },
                Observation {
                    date: d("2024-01-03"),
                    value: 301.0,
                },
            ],
        )]);
        let frame = builder().build("AAPL", &bars, &ctx).unwrap();
        assert_eq!(frame.column("cpi").unwrap(), &[300.0, 301.0, 301.0]);
    }

    #[test]
    fn univariate_frame_matches_points() {
        let bars = make_bars(&[1.0, 2.0]);
        let points: Vec<TimeSeriesPoint> = bars.iter().map(|b| b.to_point("AAPL")).collect();
        assert_eq!(
            FeatureFrame::from_points("AAPL", &points),
            FeatureFrame::univariate("AAPL", &bars)
        );
    }

    #[test]
    fn builder_omits_reference_entirely_after_prices() {
        let bars = make_bars(&[10.0, 11.0]);
        let ctx = EconomicContext::new(vec![ReferenceSeries::new(
            "GDP",
            vec![Observation {
                date: d("2025-01-01"),
                value: 1.0,
            }],
        )]);
        let frame = builder().build("AAPL", &bars, &ctx).unwrap();
        assert!(frame.column("gdp").is_none());
    }

    #[test]
    fn builder_rejects_empty_history() {
        let err = builder().build("AAPL", &[], &EconomicContext::default()).unwrap_err();
        assert!(matches!(err, ForecastError::EmptyHistory));
    }

    #[test]
    fn real_exposes_calendar_fields() {
        let frame = FeatureFrame::univariate("AAPL", &make_bars(&[1.0]));
        assert_eq!(frame.real("month").unwrap(), vec![1.0]);
        assert_eq!(frame.real("year").unwrap(), vec![2024.0]);
        assert_eq!(frame.real("time_idx").unwrap(), vec![0.0]);
        assert!(frame.real("missing").is_none());
    }
}
