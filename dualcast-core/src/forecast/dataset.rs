//! Model input assembled from a window and a fitted schema.
//!
//! Encoder: the trailing `min(max_encoder_length, window_len)` rows of every
//! encoder real, target normalised with the request's target scale and other
//! reals with their fitted scalers. Decoder: known reals and known
//! categoricals for the forecast horizon, on consecutive calendar days after
//! the last window date.

use super::model::ModelError;
use super::schema::{ModelSchema, TargetScale};
use crate::features::ForecastWindow;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub model: String,
    pub schema_fingerprint: String,
    pub group: String,
    pub encoder_length: usize,
    pub prediction_length: usize,
    /// Column names of `encoder_reals` rows.
    pub reals: Vec<String>,
    /// `encoder_length` rows, one value per entry of `reals`.
    pub encoder_reals: Vec<Vec<f64>>,
    /// Column names of `decoder_reals` rows.
    pub known_reals: Vec<String>,
    /// `prediction_length` rows, one value per entry of `known_reals`.
    pub decoder_reals: Vec<Vec<f64>>,
    pub categoricals: Vec<String>,
    pub encoder_categoricals: Vec<Vec<i64>>,
    pub decoder_categoricals: Vec<Vec<i64>>,
    /// Codes of the group identifiers that have an encoder.
    pub group_codes: Vec<i64>,
    pub target_scale: TargetScale,
}

impl ModelInput {
    pub fn from_window(
        schema: &ModelSchema,
        window: &ForecastWindow,
        model_name: &str,
    ) -> Result<Self, ModelError> {
        let frame = window.frame();
        if frame.len() < schema.min_encoder_length {
            return Err(ModelError::InsufficientHistory {
                required: schema.min_encoder_length,
                available: frame.len(),
            });
        }
        let last_date = frame
            .last_date()
            .ok_or(ModelError::InsufficientHistory {
                required: schema.min_encoder_length.max(1),
                available: 0,
            })?;

        let encoder_length = frame.len().min(schema.max_encoder_length);
        let start = frame.len() - encoder_length;

        let target = frame
            .real(&schema.target)
            .ok_or_else(|| missing_column(&schema.target))?;
        let target_scale = schema.target_normalizer.fit(&target[start..]);

        // Encoder reals, column-major first.
        let reals: Vec<String> = schema.encoder_reals().into_iter().map(String::from).collect();
        let mut encoder_columns = Vec::with_capacity(reals.len());
        for name in &reals {
            let raw = frame.real(name).ok_or_else(|| missing_column(name))?;
            let scaled: Vec<f64> = raw[start..]
                .iter()
                .map(|&x| scale_real(schema, &target_scale, name, x))
                .collect();
            encoder_columns.push(scaled);
        }
        let encoder_reals = transpose(&encoder_columns, encoder_length);

        // Decoder known reals over synthesized future dates.
        let horizon = schema.prediction_length;
        let last_time_idx = frame.time_idx().last().copied().unwrap_or(-1);
        let future: Vec<NaiveDate> = (1..=horizon as i64)
            .map(|step| last_date + Duration::days(step))
            .collect();
        let known_reals = schema.time_varying_known_reals.clone();
        let mut decoder_columns = Vec::with_capacity(known_reals.len());
        for name in &known_reals {
            let raw: Vec<f64> = match name.as_str() {
                "time_idx" => (1..=horizon as i64)
                    .map(|step| (last_time_idx + step) as f64)
                    .collect(),
                "year" => future.iter().map(|d| d.year() as f64).collect(),
                "month" => future.iter().map(|d| d.month() as f64).collect(),
                other => {
                    return Err(ModelError::SchemaMismatch(format!(
                        "known real '{other}' cannot be extended into the horizon"
                    )))
                }
            };
            decoder_columns.push(
                raw.into_iter()
                    .map(|x| scale_real(schema, &target_scale, name, x))
                    .collect::<Vec<f64>>(),
            );
        }
        let decoder_reals = transpose(&decoder_columns, horizon);

        // Categoricals.
        let categoricals = schema.time_varying_known_categoricals.clone();
        let encoder_dates = &frame.dates()[start..];
        let mut encoder_categoricals = vec![Vec::with_capacity(categoricals.len()); encoder_length];
        let mut decoder_categoricals = vec![Vec::with_capacity(categoricals.len()); horizon];
        for name in &categoricals {
            for (row, date) in encoder_dates.iter().enumerate() {
                encoder_categoricals[row].push(encode(schema, name, &label_for(name, *date, frame.group())?)?);
            }
            for (row, date) in future.iter().enumerate() {
                decoder_categoricals[row].push(encode(schema, name, &label_for(name, *date, frame.group())?)?);
            }
        }

        let group_codes = schema
            .group_ids
            .iter()
            .filter(|g| schema.categorical_encoders.contains_key(*g))
            .map(|g| encode(schema, g, frame.group()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model: model_name.to_string(),
            schema_fingerprint: schema.fingerprint().to_string(),
            group: frame.group().to_string(),
            encoder_length,
            prediction_length: horizon,
            reals,
            encoder_reals,
            known_reals,
            decoder_reals,
            categoricals,
            encoder_categoricals,
            decoder_categoricals,
            group_codes,
            target_scale,
        })
    }
}

fn missing_column(name: &str) -> ModelError {
    ModelError::SchemaMismatch(format!("window has no column '{name}'"))
}

fn scale_real(schema: &ModelSchema, target_scale: &TargetScale, name: &str, x: f64) -> f64 {
    if name == schema.target {
        target_scale.normalize(x)
    } else if let Some(scaler) = schema.scalers.get(name) {
        scaler.apply(x)
    } else {
        x
    }
}

fn label_for(name: &str, date: NaiveDate, group: &str) -> Result<String, ModelError> {
    match name {
        "month" => Ok(date.month().to_string()),
        "year" => Ok(date.year().to_string()),
        "group" => Ok(group.to_string()),
        other => Err(ModelError::SchemaMismatch(format!(
            "categorical '{other}' is not derivable from the window"
        ))),
    }
}

fn encode(schema: &ModelSchema, name: &str, label: &str) -> Result<i64, ModelError> {
    let vocab = schema
        .categorical_encoders
        .get(name)
        .ok_or_else(|| ModelError::SchemaMismatch(format!("categorical '{name}' has no encoder")))?;
    vocab
        .iter()
        .position(|l| l == label)
        .map(|i| i as i64)
        .ok_or_else(|| ModelError::SchemaMismatch(format!("unknown label '{label}' for '{name}'")))
}

fn transpose(columns: &[Vec<f64>], rows: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|r| columns.iter().map(|c| c[r]).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{FeatureFrame, WindowBuilder};
    use crate::forecast::schema::TargetNormalizer;
    use crate::indicators::make_bars;
    use std::collections::BTreeMap;

    fn window(n: usize, len: usize) -> ForecastWindow {
        let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let frame = FeatureFrame::univariate("AAPL", &make_bars(&values));
        WindowBuilder::new(len).build(&frame)
    }

    fn calendar_schema() -> ModelSchema {
        let mut schema = ModelSchema::univariate(5, 3);
        schema.min_encoder_length = 2;
        schema.time_varying_known_reals = vec!["time_idx".into(), "month".into()];
        schema.time_varying_known_categoricals = vec!["month".into()];
        schema.categorical_encoders = BTreeMap::from([
            ("month".to_string(), (1..=12).map(|m| m.to_string()).collect()),
            ("group".to_string(), vec!["MSFT".to_string(), "AAPL".to_string()]),
        ]);
        schema.target_normalizer = TargetNormalizer::Identity;
        schema
    }

    #[test]
    fn univariate_input_is_normalised_target_only() {
        let schema = ModelSchema::univariate(4, 2);
        let input = ModelInput::from_window(&schema, &window(10, 4), "nbeats").unwrap();

        assert_eq!(input.encoder_length, 4);
        assert_eq!(input.reals, vec!["value"]);
        // Encoder values 7..=10, mean abs 8.5.
        assert_eq!(input.target_scale.scale, 8.5);
        assert_eq!(input.encoder_reals[3], vec![10.0 / 8.5]);
        assert!(input.decoder_reals.iter().all(|r| r.is_empty()));
        assert_eq!(input.decoder_reals.len(), 2);
    }

    #[test]
    fn short_window_is_insufficient_history() {
        let schema = ModelSchema::univariate(80, 20);
        let err = ModelInput::from_window(&schema, &window(50, 80), "nbeats").unwrap_err();
        assert_eq!(
            err,
            ModelError::InsufficientHistory {
                required: 80,
                available: 50
            }
        );
    }

    #[test]
    fn encoder_is_capped_at_max_length() {
        let input = ModelInput::from_window(&calendar_schema(), &window(20, 10), "tft").unwrap();
        assert_eq!(input.encoder_length, 5);
        assert_eq!(input.encoder_reals.len(), 5);
        // value, time_idx, month: last encoder row is window row 9.
        assert_eq!(input.encoder_reals[4], vec![20.0, 9.0, 1.0]);
    }

    #[test]
    fn decoder_continues_time_idx_and_calendar() {
        // make_bars starts 2024-01-02; 30 rows end on 2024-01-31.
        let input = ModelInput::from_window(&calendar_schema(), &window(30, 30), "tft").unwrap();
        assert_eq!(input.decoder_reals[0], vec![30.0, 2.0]);
        assert_eq!(input.decoder_reals[2], vec![32.0, 2.0]);
        // Month "2" is code 1, "1" is code 0.
        assert_eq!(input.decoder_categoricals[0], vec![1]);
        assert_eq!(input.encoder_categoricals[0], vec![0]);
        assert_eq!(input.group_codes, vec![1]);
    }

    #[test]
    fn unknown_group_label_is_schema_mismatch() {
        let mut schema = calendar_schema();
        schema.categorical_encoders.insert("group".into(), vec!["MSFT".into()]);
        let err = ModelInput::from_window(&schema, &window(10, 10), "tft").unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }

    #[test]
    fn missing_feature_is_schema_mismatch() {
        let mut schema = ModelSchema::univariate(4, 2);
        schema.time_varying_unknown_reals.push("gdp".into());
        let err = ModelInput::from_window(&schema, &window(10, 4), "tft").unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch(_)));
    }
}
