//! Reference series: coarse-cadence context such as macro indicators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated value in a reference series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named external series sampled at arbitrary (possibly irregular) dates.
///
/// Observations are kept sorted ascending by date with unique dates; when the
/// input repeats a date the last occurrence wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSeries {
    name: String,
    observations: Vec<Observation>,
}

impl ReferenceSeries {
    pub fn new(name: impl Into<String>, mut observations: Vec<Observation>) -> Self {
        // Stable sort keeps input order among equal dates, so the later
        // duplicate sits last and survives the dedup below.
        observations.sort_by_key(|o| o.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }
        Self {
            name: name.into(),
            observations: deduped,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    /// Value at the latest observation dated on or before `date`.
    pub fn value_as_of(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.observations.partition_point(|o| o.date <= date);
        idx.checked_sub(1).map(|i| self.observations[i].value)
    }
}
