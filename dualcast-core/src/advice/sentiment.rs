//! Hugging Face inference API sentiment classifier.
//!
//! Response shape: `[[{"label": "LABEL_2", "score": 0.93}, ...]]`, labels
//! ordered by score. `LABEL_2` is the positive class; anything else reads as
//! negative.

use super::{AdviceError, Sentiment, SentimentClassifier};
use crate::config::AdviceConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct LabelScore {
    label: String,
}

pub struct HuggingFaceSentiment {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
}

impl HuggingFaceSentiment {
    pub fn new(config: &AdviceConfig) -> Result<Self, AdviceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AdviceError::Sentiment(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: config.sentiment_url.clone(),
            api_key: config.hf_api_key.clone(),
        })
    }

    fn parse(body: Vec<Vec<LabelScore>>) -> Result<Sentiment, AdviceError> {
        let top = body
            .first()
            .and_then(|labels| labels.first())
            .ok_or_else(|| AdviceError::Sentiment("empty classification result".into()))?;
        Ok(if top.label == "LABEL_2" {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        })
    }
}

impl SentimentClassifier for HuggingFaceSentiment {
    fn classify(&self, text: &str) -> Result<Sentiment, AdviceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AdviceError::MissingApiKey("HF_API_KEY"))?;
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(key)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .map_err(|e| AdviceError::Sentiment(e.to_string()))?
            .error_for_status()
            .map_err(|e| AdviceError::Sentiment(e.to_string()))?;
        let body: Vec<Vec<LabelScore>> = resp
            .json()
            .map_err(|e| AdviceError::Sentiment(format!("unexpected response: {e}")))?;
        Self::parse(body)
    }
}
