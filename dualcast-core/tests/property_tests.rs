//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. No look-ahead: aligned value at d is the latest reference value dated <= d
//! 2. Fallback determinism: an absent model yields exactly zeros of horizon length
//! 3. Indicator completeness: no NaN in any indicator column for non-empty input
//! 4. Time index monotonicity: time_idx is 0, 1, 2, ... in date order
//! 5. Merge output shape: H + 2F rows, first H historical
//! 7. Absent reference series are omitted, never null-filled

use chrono::{Duration, NaiveDate};
use dualcast_core::data::{
    align_backward, canonicalize_bars, EconomicContext, ReferenceSpec, SeriesAligner, WireBar,
};
use dualcast_core::domain::{ModelLabel, Observation, PriceBar, ReferenceSeries};
use dualcast_core::features::{FeatureFrame, FeatureFrameBuilder, WindowBuilder};
use dualcast_core::forecast::{merge_forecasts, ForecastAdapter};
use dualcast_core::indicators::IndicatorEngine;
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_values(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0..500.0_f64, 1..max_len)
}

/// Strictly increasing day offsets.
fn arb_offsets(max_len: usize) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1..40_i64, 1..max_len).prop_map(|gaps| {
        gaps.iter()
            .scan(0_i64, |acc, g| {
                *acc += g;
                Some(*acc)
            })
            .collect()
    })
}

fn bars_from(values: &[f64], volumes: &[f64]) -> Vec<PriceBar> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| PriceBar {
            date: base_date() + Duration::days(i as i64),
            open: v,
            high: v,
            low: v,
            value: v,
            volume: volumes.get(i).copied().unwrap_or(0.0),
        })
        .collect()
}

// ── 1. No look-ahead ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn aligned_value_is_latest_prior_observation(
        ref_offsets in arb_offsets(30),
        ref_values in prop::collection::vec(-1e6..1e6_f64, 30),
        primary_offsets in arb_offsets(60),
    ) {
        let reference = ReferenceSeries::new(
            "R",
            ref_offsets
                .iter()
                .zip(&ref_values)
                .map(|(o, v)| Observation { date: base_date() + Duration::days(*o), value: *v })
                .collect(),
        );
        let primary: Vec<NaiveDate> = primary_offsets.iter().map(|o| base_date() + Duration::days(*o)).collect();
        let aligned = align_backward(&primary, &reference);

        prop_assert_eq!(aligned.len(), primary.len());
        for (d, got) in primary.iter().zip(&aligned) {
            let expected = reference
                .observations()
                .iter()
                .filter(|o| o.date <= *d)
                .last()
                .map(|o| o.value);
            prop_assert_eq!(*got, expected);
        }
    }

    #[test]
    fn future_reference_changes_never_move_the_past(
        ref_offsets in arb_offsets(30),
        primary_offsets in arb_offsets(60),
        cutoff_idx in any::<prop::sample::Index>(),
    ) {
        let obs = |bump: f64, cutoff: NaiveDate| -> ReferenceSeries {
            ReferenceSeries::new(
                "R",
                ref_offsets
                    .iter()
                    .enumerate()
                    .map(|(i, o)| {
                        let date = base_date() + Duration::days(*o);
                        let value = i as f64 + if date > cutoff { bump } else { 0.0 };
                        Observation { date, value }
                    })
                    .collect(),
            )
        };
        let primary: Vec<NaiveDate> = primary_offsets.iter().map(|o| base_date() + Duration::days(*o)).collect();
        let cutoff = primary[cutoff_idx.index(primary.len())];

        let a = align_backward(&primary, &obs(0.0, cutoff));
        let b = align_backward(&primary, &obs(1000.0, cutoff));
        for (i, d) in primary.iter().enumerate() {
            if *d <= cutoff {
                prop_assert_eq!(a[i], b[i]);
            }
        }
    }
}

// ── 2. Fallback determinism ──────────────────────────────────────────

proptest! {
    #[test]
    fn absent_model_returns_zero_horizon(values in arb_values(200), horizon in 1..40_usize) {
        let frame = FeatureFrame::univariate("TEST", &bars_from(&values, &[]));
        for adapter in [
            ForecastAdapter::univariate(None, 80, horizon),
            ForecastAdapter::context(None, None, 100, horizon),
        ] {
            let outcome = adapter.forecast_frame(&frame);
            prop_assert!(outcome.is_fallback());
            let expected = vec![0.0; horizon];
            prop_assert_eq!(outcome.values(), expected.as_slice());
        }
    }
}

// ── 3. Indicator completeness ────────────────────────────────────────

proptest! {
    #[test]
    fn indicator_columns_have_no_gaps(
        values in arb_values(120),
        volumes in prop::collection::vec(prop_oneof![Just(0.0), 0.0..1e7_f64], 0..120),
    ) {
        let bars = bars_from(&values, &volumes);
        for col in IndicatorEngine::default().compute(&bars) {
            prop_assert_eq!(col.values.len(), bars.len());
            prop_assert!(col.values.iter().all(|v| !v.is_nan()), "{} has NaN", col.name);
        }
    }

    #[test]
    fn rsi_stays_in_bounds(values in arb_values(120)) {
        let bars = bars_from(&values, &[]);
        let cols = IndicatorEngine::default().compute(&bars);
        let rsi = cols.iter().find(|c| c.name == "RSI").unwrap();
        prop_assert!(rsi.values.iter().all(|v| (0.0..=100.0).contains(v)));
    }
}

// ── 4. Time index monotonicity ───────────────────────────────────────

proptest! {
    #[test]
    fn time_idx_is_dense_and_date_ordered(
        offsets in prop::collection::vec(0..400_i64, 1..150),
        window in 1..200_usize,
    ) {
        let raw: Vec<WireBar> = offsets
            .iter()
            .map(|o| WireBar {
                t: 1_672_617_600_000 + o * 86_400_000,
                o: None, h: None, l: None,
                c: Some(100.0 + *o as f64),
                v: None,
            })
            .collect();
        let bars = canonicalize_bars(&raw).unwrap();
        let builder = FeatureFrameBuilder::new(
            IndicatorEngine::default(),
            SeriesAligner::new(ReferenceSpec::defaults()),
        );
        let frame = builder.build("TEST", &bars, &EconomicContext::default()).unwrap();

        let expected: Vec<i64> = (0..frame.len() as i64).collect();
        prop_assert_eq!(frame.time_idx(), expected.as_slice());
        prop_assert!(frame.dates().windows(2).all(|w| w[0] < w[1]));

        let cut = WindowBuilder::new(window).build(&frame);
        let expected: Vec<i64> = (0..cut.len() as i64).collect();
        prop_assert_eq!(cut.frame().time_idx(), expected.as_slice());
        prop_assert_eq!(cut.len(), window.min(frame.len()));
    }
}

// ── 5. Merge output shape ────────────────────────────────────────────

proptest! {
    #[test]
    fn merged_rows_are_history_then_two_segments(
        values in arb_values(200),
        a in prop::collection::vec(-10.0..10.0_f64, 0..30),
        b_len in 0..30_usize,
    ) {
        let history = bars_from(&values, &[]);
        let b = vec![1.0; b_len];
        let merged = merge_forecasts(
            &history,
            &[(ModelLabel::Context, &a[..]), (ModelLabel::Univariate, &b[..])],
        )
        .unwrap();

        let h = history.len();
        prop_assert_eq!(merged.len(), h + a.len() + b.len());
        prop_assert!(merged[..h].iter().all(|r| r.model == ModelLabel::Historical));
        prop_assert!(merged[h..h + a.len()].iter().all(|r| r.model == ModelLabel::Context));
        prop_assert!(merged[h + a.len()..].iter().all(|r| r.model == ModelLabel::Univariate));

        let last = history.last().unwrap().date;
        for (step, row) in merged[h..h + a.len()].iter().enumerate() {
            prop_assert_eq!(row.date, last + Duration::days(step as i64 + 1));
        }
        for (step, row) in merged[h + a.len()..].iter().enumerate() {
            prop_assert_eq!(row.date, last + Duration::days(step as i64 + 1));
        }
    }
}

// ── 7. Absent reference series ───────────────────────────────────────

proptest! {
    #[test]
    fn missing_gdp_omits_its_column(values in arb_values(60)) {
        let bars = bars_from(&values, &[]);
        let ctx = EconomicContext::new(vec![ReferenceSeries::new(
            "CPIAUCSL",
            vec![Observation { date: base_date() - Duration::days(10), value: 300.0 }],
        )]);
        let builder = FeatureFrameBuilder::new(
            IndicatorEngine::default(),
            SeriesAligner::new(ReferenceSpec::defaults()),
        );
        let frame = builder.build("TEST", &bars, &ctx).unwrap();

        prop_assert!(frame.column("gdp").is_none());
        let cpi = frame.column("cpi").unwrap();
        prop_assert!(cpi.iter().all(|v| *v == 300.0));
    }
}
