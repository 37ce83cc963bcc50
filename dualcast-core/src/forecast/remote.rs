//! HTTP inference client for a model served out of process.
//!
//! `POST {endpoint}` with the `ModelInput` JSON; the server answers
//! `{"prediction": [[f64, ...], ...]}` or `{"error": "..."}`.

use super::dataset::ModelInput;
use super::model::{ModelError, Prediction, SequenceModel};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    prediction: Option<Vec<Vec<f64>>>,
    error: Option<String>,
}

pub struct RemoteModel {
    name: String,
    endpoint: String,
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl RemoteModel {
    pub fn new(name: &str, endpoint: &str, timeout: Duration) -> Result<Self, ModelError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Load(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            client,
            timeout,
        })
    }

    fn parse(body: InferenceResponse) -> Result<Prediction, ModelError> {
        if let Some(message) = body.error {
            return Err(ModelError::Inference(message));
        }
        body.prediction
            .map(|steps| Prediction { steps })
            .ok_or_else(|| ModelError::Inference("response has no prediction field".into()))
    }
}

impl SequenceModel for RemoteModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: &ModelInput) -> Result<Prediction, ModelError> {
        debug!(model = %self.name, endpoint = %self.endpoint, rows = input.encoder_length, "inference request");
        let resp = self
            .client
            .post(&self.endpoint)
            .json(input)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Inference(format!("timed out after {}s", self.timeout.as_secs()))
                } else {
                    ModelError::Inference(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        let body: InferenceResponse = resp
            .json()
            .map_err(|e| ModelError::Inference(format!("HTTP {status}, unreadable body: {e}")))?;
        if !status.is_success() && body.error.is_none() {
            return Err(ModelError::Inference(format!("HTTP {status}")));
        }
        Self::parse(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Prediction, ModelError> {
        RemoteModel::parse(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn prediction_rows_are_read() {
        let p = parse(r#"{"prediction": [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]}"#).unwrap();
        assert_eq!(p.steps.len(), 2);
        assert_eq!(p.steps[1], vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn error_field_is_inference_error() {
        let err = parse(r#"{"error": "checkpoint missing"}"#).unwrap_err();
        assert_eq!(err, ModelError::Inference("checkpoint missing".into()));
    }

    #[test]
    fn empty_body_is_inference_error() {
        assert!(parse("{}").is_err());
    }

    #[test]
    fn unreachable_endpoint_fails_without_panic() {
        let model = RemoteModel::new("tft", "http://127.0.0.1:9/predict", Duration::from_millis(200)).unwrap();
        let schema = crate::forecast::ModelSchema::univariate(1, 1);
        let frame = crate::features::FeatureFrame::univariate("AAPL", &crate::indicators::make_bars(&[1.0]));
        let window = crate::features::WindowBuilder::new(1).build(&frame);
        let input = ModelInput::from_window(&schema, &window, "tft").unwrap();
        assert!(matches!(model.predict(&input), Err(ModelError::Inference(_))));
    }
}
