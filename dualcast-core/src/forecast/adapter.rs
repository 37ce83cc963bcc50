//! Forecast adapters: one pretrained model, one window in, a horizon-length
//! forecast out, always.
//!
//! Any internal failure (model absent, schema mismatch, short history,
//! inference error, wrong step count) becomes `ForecastOutcome::Fallback`
//! with a zero vector of horizon length and the reason attached.

use super::dataset::ModelInput;
use super::model::{ModelError, SequenceModel};
use super::schema::ModelSchema;
use crate::domain::ModelLabel;
use crate::features::{FeatureFrame, ForecastWindow, WindowBuilder};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Predicted { values: Vec<f64> },
    Fallback { values: Vec<f64>, reason: String },
}

impl ForecastOutcome {
    pub fn fallback(horizon: usize, reason: impl Into<String>) -> Self {
        ForecastOutcome::Fallback {
            values: vec![0.0; horizon],
            reason: reason.into(),
        }
    }

    pub fn values(&self) -> &[f64] {
        match self {
            ForecastOutcome::Predicted { values } | ForecastOutcome::Fallback { values, .. } => values,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ForecastOutcome::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            ForecastOutcome::Fallback { reason, .. } => Some(reason),
            ForecastOutcome::Predicted { .. } => None,
        }
    }
}

/// Where an adapter's dataset schema comes from.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Fitted at training time, loaded once.
    Fitted(Arc<ModelSchema>),
    /// Built from scratch on every request.
    PerRequest { encoder_length: usize },
    /// Schema could not be loaded; every call falls back.
    Missing,
}

pub struct ForecastAdapter {
    label: ModelLabel,
    model: Option<Arc<dyn SequenceModel>>,
    schema: SchemaSource,
    window: WindowBuilder,
    horizon: usize,
}

impl ForecastAdapter {
    /// Context-rich adapter over indicator and reference features.
    pub fn context(
        model: Option<Arc<dyn SequenceModel>>,
        schema: Option<Arc<ModelSchema>>,
        window_len: usize,
        horizon: usize,
    ) -> Self {
        Self {
            label: ModelLabel::Context,
            model,
            schema: schema.map_or(SchemaSource::Missing, SchemaSource::Fitted),
            window: WindowBuilder::new(window_len),
            horizon,
        }
    }

    /// Value-only adapter with a fixed encoder length.
    pub fn univariate(
        model: Option<Arc<dyn SequenceModel>>,
        encoder_length: usize,
        horizon: usize,
    ) -> Self {
        Self {
            label: ModelLabel::Univariate,
            model,
            schema: SchemaSource::PerRequest { encoder_length },
            window: WindowBuilder::new(encoder_length),
            horizon,
        }
    }

    pub fn label(&self) -> ModelLabel {
        self.label
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some() && !matches!(self.schema, SchemaSource::Missing)
    }

    pub fn window_builder(&self) -> WindowBuilder {
        self.window
    }

    /// Cut this adapter's window from `frame` and forecast it.
    pub fn forecast_frame(&self, frame: &FeatureFrame) -> ForecastOutcome {
        self.forecast(&self.window.build(frame))
    }

    pub fn forecast(&self, window: &ForecastWindow) -> ForecastOutcome {
        match self.try_forecast(window) {
            Ok(values) => {
                debug!(model = %self.label, steps = values.len(), "forecast produced");
                ForecastOutcome::Predicted { values }
            }
            Err(err) => {
                warn!(model = %self.label, reason = %err, "forecast degraded to zero fallback");
                ForecastOutcome::fallback(self.horizon, err.to_string())
            }
        }
    }

    fn try_forecast(&self, window: &ForecastWindow) -> Result<Vec<f64>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::Unavailable)?;

        let per_request;
        let schema: &ModelSchema = match &self.schema {
            SchemaSource::Fitted(schema) => schema,
            SchemaSource::PerRequest { encoder_length } => {
                per_request = ModelSchema::univariate(*encoder_length, self.horizon);
                &per_request
            }
            SchemaSource::Missing => return Err(ModelError::Unavailable),
        };

        let input = ModelInput::from_window(schema, window, self.label.as_str())?;
        let prediction = model.predict(&input)?;
        let points = prediction.point_forecast(schema.median_quantile_index())?;
        if points.len() != self.horizon {
            return Err(ModelError::HorizonMismatch {
                expected: self.horizon,
                actual: points.len(),
            });
        }
        Ok(points
            .into_iter()
            .map(|y| input.target_scale.denormalize(y))
            .collect())
    }
}

impl fmt::Debug for ForecastAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastAdapter")
            .field("label", &self.label)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("schema", &self.schema)
            .field("window", &self.window)
            .field("horizon", &self.horizon)
            .finish()
    }
}
