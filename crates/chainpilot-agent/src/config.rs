//! Agent configuration and validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_network() -> String {
    "ethereum".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retries() -> u32 {
    3
}

/// Configuration validation errors.
///
/// These are fatal: validation runs before any component is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `api_key` missing or empty.
    #[error("apiKey must be a non-empty string")]
    MissingApiKey,

    /// `provider` is not a well-formed URL.
    #[error("provider must be a well-formed URL: {0}")]
    InvalidProviderUrl(String),
}

/// Agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// API key for the reasoning endpoint.
    pub api_key: String,

    /// JSON-RPC endpoint URL for the chain client.
    pub provider: String,

    /// Network label, informational only.
    #[serde(default = "default_network")]
    pub network: String,

    /// Base URL of an OpenAI-compatible endpoint; the public default
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,

    /// Per-request timeout, also the transaction confirmation deadline.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry budget for transport-level RPC faults.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl AgentConfig {
    /// Create a configuration with defaults for the optional fields.
    pub fn new(api_key: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            provider: provider.into(),
            network: default_network(),
            llm_base_url: None,
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }

    /// Builder method to set the network label.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Builder method to set the reasoning endpoint base URL.
    pub fn with_llm_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.llm_base_url = Some(base_url.into());
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Builder method to set the RPC retry budget.
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Validate the configuration.
    ///
    /// Runs before any collaborator is constructed; a malformed
    /// configuration never produces a partially-built agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        reqwest::Url::parse(&self.provider)
            .map_err(|_| ConfigError::InvalidProviderUrl(self.provider.clone()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = AgentConfig::new("sk-test", "https://rpc.example.org");
        assert!(config.validate().is_ok());
        assert_eq!(config.network, "ethereum");
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = AgentConfig::new("  ", "https://rpc.example.org");
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn test_malformed_provider_rejected() {
        let config = AgentConfig::new("sk-test", "not a url");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidProviderUrl(_))
        ));
    }

    #[test]
    fn test_defaults_from_json() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"apiKey": "sk-test", "provider": "https://rpc.example.org"}"#,
        )
        .unwrap();
        assert_eq!(config.network, "ethereum");
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.retries, 3);
        assert!(config.llm_base_url.is_none());
    }
}
