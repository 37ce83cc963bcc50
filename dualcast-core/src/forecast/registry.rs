//! The two forecast adapters, built once at startup and shared read-only.

use super::adapter::ForecastAdapter;
use super::model::{ModelError, SequenceModel};
use super::remote::RemoteModel;
use super::schema::ModelSchema;
use crate::config::ModelsConfig;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct ForecastModels {
    pub context: ForecastAdapter,
    pub univariate: ForecastAdapter,
}

impl ForecastModels {
    pub fn new(context: ForecastAdapter, univariate: ForecastAdapter) -> Self {
        Self {
            context,
            univariate,
        }
    }

    /// Build both adapters from configuration. Never fails: a model that
    /// cannot be set up is logged and left absent, so its adapter falls back.
    pub fn load(config: &ModelsConfig) -> Self {
        let timeout = config.inference_timeout();

        let (context_model, context_schema) = match load_context(config) {
            Ok((model, schema)) => (Some(model), Some(schema)),
            Err(err) => {
                warn!(model = "tft", error = %err, "context model unavailable, forecasts will fall back");
                (None, None)
            }
        };

        let univariate_model: Option<Arc<dyn SequenceModel>> = match &config.univariate.endpoint {
            Some(endpoint) => match RemoteModel::new("nbeats", endpoint, timeout) {
                Ok(model) => {
                    info!(model = "nbeats", %endpoint, "univariate model ready");
                    Some(Arc::new(model))
                }
                Err(err) => {
                    warn!(model = "nbeats", error = %err, "univariate model unavailable, forecasts will fall back");
                    None
                }
            },
            None => {
                warn!(model = "nbeats", "no endpoint configured, forecasts will fall back");
                None
            }
        };

        Self {
            context: ForecastAdapter::context(
                context_model,
                context_schema,
                config.context.window_len,
                config.horizon,
            ),
            univariate: ForecastAdapter::univariate(
                univariate_model,
                config.univariate.encoder_length,
                config.horizon,
            ),
        }
    }
}

fn load_context(
    config: &ModelsConfig,
) -> Result<(Arc<dyn SequenceModel>, Arc<ModelSchema>), ModelError> {
    let endpoint = config
        .context
        .endpoint
        .as_deref()
        .ok_or_else(|| ModelError::Load("no endpoint configured".into()))?;
    let path = config
        .context
        .schema_path
        .as_deref()
        .ok_or_else(|| ModelError::Load("no schema path configured".into()))?;

    let schema = ModelSchema::load(path)?;
    if schema.prediction_length != config.horizon {
        return Err(ModelError::SchemaMismatch(format!(
            "schema prediction_length {} differs from horizon {}",
            schema.prediction_length, config.horizon
        )));
    }
    let model = RemoteModel::new("tft", endpoint, config.inference_timeout())?;
    info!(
        model = "tft",
        %endpoint,
        fingerprint = %schema.fingerprint(),
        "context model ready"
    );
    Ok((Arc::new(model), Arc::new(schema)))
}
