//! OpenAI chat-completions advice generator.

use super::{AdviceError, AdviceGenerator};
use crate::config::AdviceConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub struct OpenAiAdvisor {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: Option<String>,
}

impl OpenAiAdvisor {
    pub fn new(config: &AdviceConfig) -> Result<Self, AdviceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AdviceError::Generation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key: config.openai_api_key.clone(),
        })
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    fn parse(body: ChatResponse) -> Result<String, AdviceError> {
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| AdviceError::Generation("no completion returned".into()))
    }
}

impl AdviceGenerator for OpenAiAdvisor {
    fn generate(&self, prompt: &str) -> Result<String, AdviceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AdviceError::MissingApiKey("OPENAI_API_KEY"))?;
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&self.request(prompt))
            .send()
            .map_err(|e| AdviceError::Generation(e.to_string()))?
            .error_for_status()
            .map_err(|e| AdviceError::Generation(e.to_string()))?;
        let body: ChatResponse = resp
            .json()
            .map_err(|e| AdviceError::Generation(format!("unexpected response: {e}")))?;
        Self::parse(body)
    }
}
