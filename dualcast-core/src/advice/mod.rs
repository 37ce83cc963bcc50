//! News sentiment and investment advice.
//!
//! Two opaque services in sequence: a sentiment classifier labels the news,
//! then a text generator writes a short buy/hold/sell recommendation from
//! the symbol, the news and that label.

pub mod openai;
pub mod sentiment;

pub use openai::OpenAiAdvisor;
pub use sentiment::HuggingFaceSentiment;

use crate::config::AdviceConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("sentiment analysis failed: {0}")]
    Sentiment(String),

    #[error("advice generation failed: {0}")]
    Generation(String),

    #[error("missing API key: {0}")]
    MissingApiKey(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Sentiment, AdviceError>;
}

pub trait AdviceGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub sentiment: Sentiment,
    pub advice: String,
}

pub struct AdviceService {
    classifier: Box<dyn SentimentClassifier>,
    generator: Box<dyn AdviceGenerator>,
}

impl AdviceService {
    pub fn new(classifier: Box<dyn SentimentClassifier>, generator: Box<dyn AdviceGenerator>) -> Self {
        Self {
            classifier,
            generator,
        }
    }

    /// Hugging Face classifier and OpenAI chat completion from config.
    ///
    /// Missing keys are not an error here; the first call reports them.
    pub fn from_config(config: &AdviceConfig) -> Result<Self, AdviceError> {
        Ok(Self::new(
            Box::new(HuggingFaceSentiment::new(config)?),
            Box::new(OpenAiAdvisor::new(config)?),
        ))
    }

    pub fn analyze(&self, symbol: &str, news: &str) -> Result<Advice, AdviceError> {
        let sentiment = self
            .classifier
            .classify(&format!("For stock symbol {symbol}, {news}"))?;
        info!(%symbol, %sentiment, "news sentiment classified");
        let advice = self.generator.generate(&advice_prompt(symbol, news, sentiment))?;
        Ok(Advice { sentiment, advice })
    }
}

pub fn advice_prompt(symbol: &str, news: &str, sentiment: Sentiment) -> String {
    format!(
        "Stock Symbol: {symbol}\n\
         News Summary: {news}\n\
         Sentiment Analysis: {sentiment}\n\n\
         Based on the news and sentiment analysis, provide a detailed investment recommendation for {symbol}. \
         Should an investor buy, hold, or sell? Explain your reasoning in 2-3 sentences."
    )
}
