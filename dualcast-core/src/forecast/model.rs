//! The sequence-model seam and its error type.

use super::dataset::ModelInput;
use serde::{Deserialize, Serialize};

/// Adapter-internal failures. Never surfaced to the caller as a request
/// error; each one becomes a fallback forecast.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("model not loaded")]
    Unavailable,

    #[error("model load failed: {0}")]
    Load(String),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("insufficient history: need {required} rows, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model returned {actual} steps, expected {expected}")]
    HorizonMismatch { expected: usize, actual: usize },
}

/// Raw model output: one row per forecast step, one value per quantile (or a
/// single point value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub steps: Vec<Vec<f64>>,
}

impl Prediction {
    pub fn points(values: Vec<f64>) -> Self {
        Self {
            steps: values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    /// One value per step. Multi-quantile rows take `median_index` when
    /// given and in range, otherwise the middle entry.
    pub fn point_forecast(&self, median_index: Option<usize>) -> Result<Vec<f64>, ModelError> {
        self.steps
            .iter()
            .enumerate()
            .map(|(step, row)| match row.len() {
                0 => Err(ModelError::Inference(format!("step {step} has no values"))),
                1 => Ok(row[0]),
                n => {
                    let idx = median_index.filter(|&i| i < n).unwrap_or(n / 2);
                    Ok(row[idx])
                }
            })
            .collect()
    }
}

/// A loaded, read-only forecasting model. Shared across requests, so
/// `predict` must not mutate model state.
pub trait SequenceModel: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, input: &ModelInput) -> Result<Prediction, ModelError>;
}
