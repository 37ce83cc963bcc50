//! Historical rows followed by each forecast segment.
//!
//! Every segment starts the calendar day after the last historical date and
//! runs on consecutive calendar days. Segments share that anchor; they are
//! neither chained nor interleaved.

use crate::domain::{ForecastResult, ModelLabel, PriceBar};
use crate::error::ForecastError;
use chrono::Duration;

pub fn merge_forecasts(
    history: &[PriceBar],
    segments: &[(ModelLabel, &[f64])],
) -> Result<Vec<ForecastResult>, ForecastError> {
    let anchor = history
        .iter()
        .map(|b| b.date)
        .max()
        .ok_or(ForecastError::EmptyHistory)?;

    let total = history.len() + segments.iter().map(|(_, v)| v.len()).sum::<usize>();
    let mut merged = Vec::with_capacity(total);

    merged.extend(history.iter().map(|bar| ForecastResult {
        date: bar.date,
        value: bar.value,
        model: ModelLabel::Historical,
    }));

    for (label, values) in segments {
        merged.extend(values.iter().enumerate().map(|(step, &value)| ForecastResult {
            date: anchor + Duration::days(step as i64 + 1),
            value,
            model: *label,
        }));
    }

    Ok(merged)
}
