//! Point-in-time alignment of coarse reference series onto a daily series.
//!
//! Each primary date receives the value of the latest reference observation
//! dated on or before it (backward join). No reference value dated after a
//! primary row can reach that row. Dates are calendar dates, so intraday
//! timestamps were already stripped when the series were built.
//!
//! The aligner never fills: rows preceding a reference's first observation
//! stay `None`. The frame builder drops any column that does not cover the
//! first primary row.

use super::economic::{EconomicContext, ReferenceSpec};
use crate::domain::ReferenceSeries;
use chrono::NaiveDate;
use tracing::debug;

/// One reference series joined onto the primary timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedColumn {
    pub name: String,
    /// Same length and order as the primary dates.
    pub values: Vec<Option<f64>>,
}

impl AlignedColumn {
    /// True when the first primary row already has an observation. With
    /// sorted primary dates every later row then has one as well.
    pub fn covers_start(&self) -> bool {
        matches!(self.values.first(), Some(Some(_)))
    }
}

/// Backward join of a single reference series. Output preserves the length
/// and order of `primary`, sorted or not.
pub fn align_backward(primary: &[NaiveDate], reference: &ReferenceSeries) -> Vec<Option<f64>> {
    primary.iter().map(|&d| reference.value_as_of(d)).collect()
}

/// Joins the declared reference series onto a primary timeline.
#[derive(Debug, Clone)]
pub struct SeriesAligner {
    references: Vec<ReferenceSpec>,
}

impl SeriesAligner {
    pub fn new(references: Vec<ReferenceSpec>) -> Self {
        Self { references }
    }

    pub fn references(&self) -> &[ReferenceSpec] {
        &self.references
    }

    /// One column per declared reference present in `context`, in declaration
    /// order. References absent from the context are skipped.
    pub fn align(&self, primary: &[NaiveDate], context: &EconomicContext) -> Vec<AlignedColumn> {
        self.references
            .iter()
            .filter_map(|spec| {
                let Some(series) = context.get(&spec.series_id) else {
                    debug!(series = %spec.series_id, "reference series absent, column omitted");
                    return None;
                };
                let divisor = if spec.divisor == 0.0 { 1.0 } else { spec.divisor };
                let values = align_backward(primary, series)
                    .into_iter()
                    .map(|v| v.map(|x| x / divisor))
                    .collect();
                Some(AlignedColumn {
                    name: spec.column.clone(),
                    values,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::economic::SeriesSource;
    use crate::domain::Observation;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn series(name: &str, points: &[(&str, f64)]) -> ReferenceSeries {
        ReferenceSeries::new(
            name,
            points
                .iter()
                .map(|(date, value)| Observation {
                    date: d(date),
                    value: *value,
                })
                .collect(),
        )
    }

    #[test]
    fn backward_join_uses_latest_prior_observation() {
        let cpi = series("CPIAUCSL", &[("2024-01-01", 300.0), ("2024-02-01", 301.0)]);
        let primary = [d("2023-12-29"), d("2024-01-02"), d("2024-01-31"), d("2024-02-01"), d("2024-02-15")];
        let aligned = align_backward(&primary, &cpi);
        assert_eq!(aligned, vec![None, Some(300.0), Some(300.0), Some(301.0), Some(301.0)]);
    }

    #[test]
    fn coverage_requires_an_observation_on_the_first_row() {
        let cpi = series("CPIAUCSL", &[("2024-01-04", 300.0)]);
        let late = AlignedColumn {
            name: "cpi".into(),
            values: align_backward(&[d("2024-01-02"), d("2024-01-05")], &cpi),
        };
        assert!(!late.covers_start());
        let covered = AlignedColumn {
            name: "cpi".into(),
            values: align_backward(&[d("2024-01-04"), d("2024-01-05")], &cpi),
        };
        assert!(covered.covers_start());
    }

    #[test]
    fn output_follows_primary_order() {
        let cpi = series("CPIAUCSL", &[("2024-01-01", 1.0), ("2024-02-01", 2.0)]);
        let primary = [d("2024-02-10"), d("2024-01-10")];
        assert_eq!(align_backward(&primary, &cpi), vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn aligner_applies_column_names_and_divisors() {
        let aligner = SeriesAligner::new(ReferenceSpec::defaults());
        let ctx = EconomicContext::new(vec![
            series("GDP", &[("2024-01-01", 28_000.0)]),
            series("SPY", &[("2024-01-02", 470.0)]),
        ]);
        let cols = aligner.align(&[d("2024-01-05")], &ctx);

        let names: Vec<&str> = cols.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["gdp", "spy"]);
        assert_eq!(cols[0].values, vec![Some(560.0)]);
        assert_eq!(cols[1].values, vec![Some(470.0)]);
    }

    #[test]
    fn absent_reference_is_omitted_without_error() {
        let aligner = SeriesAligner::new(vec![
            ReferenceSpec::new("GDP", SeriesSource::Fred, "gdp", 50.0),
            ReferenceSpec::new("CPIAUCSL", SeriesSource::Fred, "cpi", 1.0),
        ]);
        let ctx = EconomicContext::new(vec![series("CPIAUCSL", &[("2024-01-01", 300.0)])]);
        let cols = aligner.align(&[d("2024-01-05")], &ctx);
        assert_eq!(cols.len(), 1);
        assert_eq!(cols[0].name, "cpi");
    }
}
