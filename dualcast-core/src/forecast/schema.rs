//! Training-time dataset schema for a sequence model.
//!
//! Captured when the model was fitted and loaded once at startup. Every
//! inference call rebuilds its input from this value, never from ambient state.

use super::model::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Per-feature standardisation: `(x - center) / scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64,
    pub scale: f64,
}

impl ScalerParams {
    pub fn apply(&self, x: f64) -> f64 {
        (x - self.center) / safe_scale(self.scale)
    }
}

/// How the target is normalised before it reaches the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetNormalizer {
    /// Scale fitted per request from the group's encoder history. With
    /// `center` the target is standardised (mean, std); without it only
    /// divided by its mean absolute value.
    Group {
        #[serde(default)]
        center: bool,
    },
    /// Scale fixed at training time.
    Fixed { center: f64, scale: f64 },
    Identity,
}

impl TargetNormalizer {
    pub fn fit(&self, history: &[f64]) -> TargetScale {
        match *self {
            TargetNormalizer::Identity => TargetScale::IDENTITY,
            TargetNormalizer::Fixed { center, scale } => TargetScale::new(center, scale),
            TargetNormalizer::Group { center } => {
                if history.is_empty() {
                    return TargetScale::IDENTITY;
                }
                let n = history.len() as f64;
                if center {
                    let mean = history.iter().sum::<f64>() / n;
                    let var = history.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                    TargetScale::new(mean, var.sqrt())
                } else {
                    let mean_abs = history.iter().map(|x| x.abs()).sum::<f64>() / n;
                    TargetScale::new(0.0, mean_abs)
                }
            }
        }
    }
}

/// The (center, scale) pair applied to the target for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScale {
    pub center: f64,
    pub scale: f64,
}

impl TargetScale {
    pub const IDENTITY: TargetScale = TargetScale {
        center: 0.0,
        scale: 1.0,
    };

    pub fn new(center: f64, scale: f64) -> Self {
        Self {
            center,
            scale: safe_scale(scale),
        }
    }

    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.center) / self.scale
    }

    pub fn denormalize(&self, y: f64) -> f64 {
        y * self.scale + self.center
    }
}

fn safe_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale.abs() > f64::EPSILON {
        scale
    } else {
        1.0
    }
}

/// Hex BLAKE3 digest of a schema's canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaFingerprint(String);

impl SchemaFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub target: String,
    #[serde(default)]
    pub group_ids: Vec<String>,
    pub min_encoder_length: usize,
    pub max_encoder_length: usize,
    pub prediction_length: usize,
    #[serde(default)]
    pub time_varying_known_reals: Vec<String>,
    #[serde(default)]
    pub time_varying_unknown_reals: Vec<String>,
    #[serde(default)]
    pub time_varying_known_categoricals: Vec<String>,
    /// Label vocabulary per categorical; a label's code is its position.
    #[serde(default)]
    pub categorical_encoders: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub scalers: BTreeMap<String, ScalerParams>,
    pub target_normalizer: TargetNormalizer,
    #[serde(default)]
    pub quantiles: Vec<f64>,
}

impl ModelSchema {
    /// Read and validate a schema from JSON.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ModelError::Load(format!("read {}: {e}", path.display())))?;
        let schema: ModelSchema = serde_json::from_str(&text)
            .map_err(|e| ModelError::Load(format!("parse {}: {e}", path.display())))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Value-only schema: the target is the sole input, normalised per group
    /// without centring, fixed encoder length.
    pub fn univariate(encoder_length: usize, horizon: usize) -> Self {
        Self {
            target: "value".into(),
            group_ids: vec!["group".into()],
            min_encoder_length: encoder_length,
            max_encoder_length: encoder_length,
            prediction_length: horizon,
            time_varying_known_reals: Vec::new(),
            time_varying_unknown_reals: vec!["value".into()],
            time_varying_known_categoricals: Vec::new(),
            categorical_encoders: BTreeMap::new(),
            scalers: BTreeMap::new(),
            target_normalizer: TargetNormalizer::Group { center: false },
            quantiles: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.target.is_empty() {
            return Err(ModelError::SchemaMismatch("empty target name".into()));
        }
        if self.prediction_length == 0 {
            return Err(ModelError::SchemaMismatch("prediction_length is zero".into()));
        }
        if self.max_encoder_length == 0 || self.min_encoder_length > self.max_encoder_length {
            return Err(ModelError::SchemaMismatch(format!(
                "encoder length bounds {}..={} are invalid",
                self.min_encoder_length, self.max_encoder_length
            )));
        }
        if let Some(cat) = self
            .time_varying_known_categoricals
            .iter()
            .find(|c| !self.categorical_encoders.contains_key(*c))
        {
            return Err(ModelError::SchemaMismatch(format!(
                "categorical '{cat}' has no encoder"
            )));
        }
        Ok(())
    }

    /// Every real the encoder sees: unknown reals, then known reals not
    /// already listed.
    pub fn encoder_reals(&self) -> Vec<&str> {
        let mut reals: Vec<&str> = self
            .time_varying_unknown_reals
            .iter()
            .map(String::as_str)
            .collect();
        for known in &self.time_varying_known_reals {
            if !reals.contains(&known.as_str()) {
                reals.push(known);
            }
        }
        reals
    }

    /// Position of the quantile nearest 0.5, if the model emits quantiles.
    pub fn median_quantile_index(&self) -> Option<usize> {
        self.quantiles
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1 - 0.5).abs().total_cmp(&(b.1 - 0.5).abs()))
            .map(|(i, _)| i)
    }

    pub fn fingerprint(&self) -> SchemaFingerprint {
        // BTreeMap fields keep the serialisation order stable.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        SchemaFingerprint(blake3::hash(&canonical).to_hex().to_string())
    }
}
