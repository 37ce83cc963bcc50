//! Service configuration.
//!
//! Built-in defaults, overlaid by an optional TOML file, overlaid by
//! environment variables. Every section is optional in the file.

use crate::data::ReferenceSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub data: DataConfig,
    pub models: ModelsConfig,
    pub advice: AdviceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub fetch_timeout_secs: u64,
    /// Reference window length ending at the request date.
    pub lookback_days: i64,
    pub fred_base_url: String,
    pub yahoo_base_url: String,
    pub fred_api_key: Option<String>,
    pub default_symbol: String,
    pub references: Vec<ReferenceSpec>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            lookback_days: 18 * 30,
            fred_base_url: "https://api.stlouisfed.org".into(),
            yahoo_base_url: "https://query1.finance.yahoo.com".into(),
            fred_api_key: None,
            default_symbol: "AAPL".into(),
            references: ReferenceSpec::defaults(),
        }
    }
}

impl DataConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub horizon: usize,
    pub inference_timeout_secs: u64,
    pub context: ContextModelConfig,
    pub univariate: UnivariateModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            horizon: 20,
            inference_timeout_secs: 30,
            context: ContextModelConfig::default(),
            univariate: UnivariateModelConfig::default(),
        }
    }
}

impl ModelsConfig {
    pub fn inference_timeout(&self) -> Duration {
        Duration::from_secs(self.inference_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextModelConfig {
    pub endpoint: Option<String>,
    pub schema_path: Option<PathBuf>,
    pub window_len: usize,
}

impl Default for ContextModelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            schema_path: None,
            window_len: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnivariateModelConfig {
    pub endpoint: Option<String>,
    pub encoder_length: usize,
}

impl Default for UnivariateModelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            encoder_length: 80,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    pub sentiment_url: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub hf_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            sentiment_url:
                "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment"
                    .into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            openai_model: "gpt-3.5-turbo".into(),
            max_tokens: 200,
            temperature: 0.7,
            request_timeout_secs: 30,
            hf_api_key: None,
            openai_api_key: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a config from a TOML string. Missing sections take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("PORT '{port}': {e}")))?;
        }
        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(key) = get("FRED_API_KEY") {
            self.data.fred_api_key = Some(key);
        }
        if let Some(key) = get("HF_API_KEY") {
            self.advice.hf_api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.advice.openai_api_key = Some(key);
        }
        if let Some(url) = get("DUALCAST_CONTEXT_MODEL_URL") {
            self.models.context.endpoint = Some(url);
        }
        if let Some(path) = get("DUALCAST_CONTEXT_SCHEMA") {
            self.models.context.schema_path = Some(PathBuf::from(path));
        }
        if let Some(url) = get("DUALCAST_UNIVARIATE_MODEL_URL") {
            self.models.univariate.endpoint = Some(url);
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.horizon == 0 {
            return Err(ConfigError::Invalid("models.horizon must be positive".into()));
        }
        if self.models.context.window_len == 0 || self.models.univariate.encoder_length == 0 {
            return Err(ConfigError::Invalid("model window lengths must be positive".into()));
        }
        if self.data.lookback_days <= 0 {
            return Err(ConfigError::Invalid("data.lookback_days must be positive".into()));
        }
        if let Some(dup) = self
            .data
            .references
            .iter()
            .enumerate()
            .find(|(i, r)| self.data.references[..*i].iter().any(|o| o.column == r.column))
        {
            return Err(ConfigError::Invalid(format!(
                "duplicate reference column '{}'",
                dup.1.column
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesSource;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_service_contract() {
        let c = ServiceConfig::default();
        assert_eq!(c.server.port, 5000);
        assert_eq!(c.data.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(c.data.lookback_days, 540);
        assert_eq!(c.models.horizon, 20);
        assert_eq!(c.models.context.window_len, 100);
        assert_eq!(c.models.univariate.encoder_length, 80);
        assert_eq!(c.advice.openai_model, "gpt-3.5-turbo");
        assert_eq!(c.data.references.len(), 3);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = ServiceConfig::from_toml(
            r#"
            [server]
            port = 8080

            [models.context]
            endpoint = "http://localhost:9000/tft"
            "#,
        )
        .unwrap();
        assert_eq!(c.server.port, 8080);
        assert_eq!(c.server.host, "0.0.0.0");
        assert_eq!(c.models.context.endpoint.as_deref(), Some("http://localhost:9000/tft"));
        assert_eq!(c.models.context.window_len, 100);
    }

    #[test]
    fn references_are_configurable() {
        let c = ServiceConfig::from_toml(
            r#"
            [[data.references]]
            series_id = "UNRATE"
            source = "fred"
            column = "unemployment"
            "#,
        )
        .unwrap();
        assert_eq!(c.data.references.len(), 1);
        assert_eq!(c.data.references[0].source, SeriesSource::Fred);
        assert_eq!(c.data.references[0].divisor, 1.0);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "7000"),
            ("FRED_API_KEY", "abc"),
            ("DUALCAST_CONTEXT_SCHEMA", "/models/tft.json"),
            ("HOST", ""),
        ]);
        let mut c = ServiceConfig::default();
        c.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.server.port, 7000);
        assert_eq!(c.server.host, "0.0.0.0");
        assert_eq!(c.data.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(c.models.context.schema_path, Some(PathBuf::from("/models/tft.json")));
    }

    #[test]
    fn bad_port_is_invalid() {
        let mut c = ServiceConfig::default();
        let err = c.apply_env(|k| (k == "PORT").then(|| "http".to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let err = ServiceConfig::from_toml("[models]\nhorizon = 0\n").unwrap_err();
        assert!(err.to_string().contains("horizon"));
    }

    #[test]
    fn config_file_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dualcast.toml");
        std::fs::write(&path, "[data]\nlookback_days = 365\n").unwrap();
        let c = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(c.data.lookback_days, 365);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ServiceConfig::from_file(Path::new("/nonexistent/dualcast.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
