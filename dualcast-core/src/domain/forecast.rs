//! Merged forecast rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which series a merged row belongs to.
///
/// Wire names match what existing chart consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelLabel {
    #[serde(rename = "historical")]
    Historical,
    /// Context-rich adapter (indicators + macro features).
    #[serde(rename = "tft")]
    Context,
    /// Univariate adapter (raw value history only).
    #[serde(rename = "nbeats")]
    Univariate,
}

impl ModelLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelLabel::Historical => "historical",
            ModelLabel::Context => "tft",
            ModelLabel::Univariate => "nbeats",
        }
    }
}

impl fmt::Display for ModelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the merged response: `{date, value, model}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub date: NaiveDate,
    pub value: f64,
    pub model: ModelLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_to_wire_names() {
        let row = ForecastResult {
            date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            value: 1.5,
            model: ModelLabel::Context,
        };
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"date":"2024-01-11","value":1.5,"model":"tft"}"#);
    }

    #[test]
    fn display_matches_serde() {
        for label in [ModelLabel::Historical, ModelLabel::Context, ModelLabel::Univariate] {
            let json = serde_json::to_string(&label).unwrap();
            assert_eq!(json, format!("\"{label}\""));
        }
    }
}
