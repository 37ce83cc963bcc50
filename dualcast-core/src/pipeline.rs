//! Forecast orchestration for one request.
//!
//! canonicalise bars → fetch economic context → feature frames → both
//! adapters (run concurrently) → merge. Data failures abort the request;
//! model failures only degrade their own segment.

use crate::config::ServiceConfig;
use crate::data::{
    canonicalize_bars, DataError, EconomicContext, EconomicSource, FredProvider,
    LiveEconomicSource, SeriesAligner, WireBar, YahooProvider,
};
use crate::domain::{ForecastResult, ModelLabel, PriceBar};
use crate::error::ForecastError;
use crate::features::{FeatureFrame, FeatureFrameBuilder};
use crate::forecast::{merge_forecasts, ForecastModels, ForecastOutcome};
use crate::indicators::IndicatorEngine;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Body of a forecast request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub current_data: Vec<WireBar>,
    #[serde(default)]
    pub fred_key: Option<String>,
}

/// Everything derived from a request before any model runs.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub context: EconomicContext,
    pub frame: FeatureFrame,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastResponse {
    /// Outer-joined, filled reference table.
    pub economic: Vec<serde_json::Map<String, serde_json::Value>>,
    pub merged: Vec<ForecastResult>,
    pub context: ForecastOutcome,
    pub univariate: ForecastOutcome,
}

impl ForecastResponse {
    /// `[economic_json, merged_json]`, each element a JSON string.
    pub fn to_wire(&self) -> Result<serde_json::Value, ForecastError> {
        let economic = serde_json::to_string(&self.economic)?;
        let merged = serde_json::to_string(&self.merged)?;
        Ok(serde_json::Value::Array(vec![
            serde_json::Value::String(economic),
            serde_json::Value::String(merged),
        ]))
    }
}

pub struct ForecastService {
    economic: Box<dyn EconomicSource>,
    models: Arc<ForecastModels>,
    features: FeatureFrameBuilder,
    default_symbol: String,
    fred_api_key: Option<String>,
}

impl ForecastService {
    pub fn new(
        economic: Box<dyn EconomicSource>,
        models: Arc<ForecastModels>,
        features: FeatureFrameBuilder,
        default_symbol: impl Into<String>,
        fred_api_key: Option<String>,
    ) -> Self {
        Self {
            economic,
            models,
            features,
            default_symbol: default_symbol.into(),
            fred_api_key,
        }
    }

    /// Live FRED and Yahoo providers plus the default indicator set.
    ///
    /// Builds blocking HTTP clients; call outside any async runtime.
    pub fn from_config(
        config: &ServiceConfig,
        models: Arc<ForecastModels>,
    ) -> Result<Self, DataError> {
        let data = &config.data;
        let economic = LiveEconomicSource::new(
            Box::new(FredProvider::new(&data.fred_base_url, data.fetch_timeout())?),
            Box::new(YahooProvider::new(&data.yahoo_base_url, data.fetch_timeout())?),
            data.references.clone(),
            data.lookback_days,
        );
        let features = FeatureFrameBuilder::new(
            IndicatorEngine::default(),
            SeriesAligner::new(data.references.clone()),
        );
        Ok(Self::new(
            Box::new(economic),
            models,
            features,
            data.default_symbol.clone(),
            data.fred_api_key.clone(),
        ))
    }

    pub fn models(&self) -> &ForecastModels {
        &self.models
    }

    /// Validate the request and build its feature frame.
    pub fn prepare(
        &self,
        request: &ForecastRequest,
        as_of: NaiveDate,
    ) -> Result<PreparedRequest, ForecastError> {
        let symbol = request
            .symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_symbol.as_str())
            .to_uppercase();

        if request.current_data.is_empty() {
            return Err(ForecastError::InvalidInput("current_data is empty".into()));
        }
        let bars = canonicalize_bars(&request.current_data).map_err(|e| match e {
            DataError::ValidationError(msg) => ForecastError::InvalidInput(msg),
            other => ForecastError::Data(other),
        })?;

        let api_key = request
            .fred_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or(self.fred_api_key.as_deref())
            .ok_or(ForecastError::MissingApiKey)?;

        let context = self.economic.fetch_context(as_of, api_key)?;
        let frame = self.features.build(&symbol, &bars, &context)?;

        Ok(PreparedRequest {
            symbol,
            bars,
            context,
            frame,
        })
    }

    pub fn forecast(
        &self,
        request: &ForecastRequest,
        as_of: NaiveDate,
    ) -> Result<ForecastResponse, ForecastError> {
        let prepared = self.prepare(request, as_of)?;
        let univariate_frame = FeatureFrame::univariate(&prepared.symbol, &prepared.bars);

        let (context, univariate) = rayon::join(
            || self.models.context.forecast_frame(&prepared.frame),
            || self.models.univariate.forecast_frame(&univariate_frame),
        );

        let merged = merge_forecasts(
            &prepared.bars,
            &[
                (ModelLabel::Context, context.values()),
                (ModelLabel::Univariate, univariate.values()),
            ],
        )?;

        info!(
            symbol = %prepared.symbol,
            history = prepared.bars.len(),
            context_fallback = context.is_fallback(),
            univariate_fallback = univariate.is_fallback(),
            "forecast complete"
        );

        Ok(ForecastResponse {
            economic: prepared.context.to_table(),
            merged,
            context,
            univariate,
        })
    }
}
