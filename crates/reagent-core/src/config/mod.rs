//! Configuration for agents and the model provider

use crate::error::AgentResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent loop properties
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentProperties {
    /// Maximum think/act cycles per agent invocation
    pub max_steps: u32,
    /// Number of conversation messages retrieved during prompt assembly
    pub memory_retrieve_size: usize,
}

impl Default for AgentProperties {
    fn default() -> Self {
        Self {
            max_steps: 10,
            memory_retrieve_size: crate::memory::DEFAULT_RETRIEVE_SIZE,
        }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key; prefer `api_key_env` to keep keys out of config files
    pub api_key: Option<String>,
    /// Environment variable to read the API key from
    pub api_key_env: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum completion tokens
    pub max_tokens: Option<u32>,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            temperature: None,
            max_tokens: None,
            request_timeout_secs: 60,
        }
    }
}

impl ModelConfig {
    /// Resolve the API key from config or the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
        })
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Agent loop properties
    pub agent: AgentProperties,
    /// Model provider configuration
    pub model: ModelConfig,
}

impl Config {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> AgentResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> AgentResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.agent.memory_retrieve_size, 100);
        assert_eq!(config.model.request_timeout_secs, 60);
        assert_eq!(config.model.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = Config::from_toml_str(
            r#"
            [agent]
            max_steps = 3

            [model]
            base_url = "http://localhost:11434/v1"
            model = "llama3"
            temperature = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.agent.memory_retrieve_size, 100);
        assert_eq!(config.model.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.temperature, Some(0.2));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("max_steps = [").unwrap_err();
        assert!(matches!(err, crate::error::AgentError::Config(_)));
    }

    #[test]
    fn test_inline_api_key_wins() {
        let config = ModelConfig {
            api_key: Some("inline".to_string()),
            api_key_env: Some("REAGENT_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("inline"));
    }
}
