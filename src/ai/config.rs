//! Generation service configuration
//!
//! The API key supports `${VAR}` placeholders that are resolved against the
//! process environment when the configuration is loaded.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model requested from the generation service
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
/// Default Messages API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com/v1";
/// Environment variable consulted for the credential
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Settings for the external generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Whether the service is used at all; when false every artifact comes
    /// from the fallback template
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Provider name
    #[serde(default = "default_provider")]
    pub provider: String,

    /// API endpoint (base URL, without `/messages`)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (supports environment variable substitution)
    #[serde(default = "default_api_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model name to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for generation (0.0-2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds; unset means wait indefinitely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "anthropic".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_api_key() -> Option<String> {
    Some(format!("${{{}}}", API_KEY_ENV))
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: default_provider(),
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            timeout_secs: None,
        }
    }
}

impl GeneratorConfig {
    /// Disabled configuration: the fallback template is always used
    pub fn offline() -> Self {
        Self {
            enabled: false,
            api_key: None,
            ..Self::default()
        }
    }

    /// Resolve `${VAR}` placeholders in the API key.
    ///
    /// A placeholder whose variable is unset or empty resolves to no key.
    pub fn expand_env_vars(&mut self) {
        let Some(api_key) = self.api_key.clone() else {
            return;
        };

        if let Some(var) = placeholder_name(&api_key) {
            match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => {
                    tracing::debug!("Resolved API key from environment variable {}", var);
                    self.api_key = Some(value.trim().to_string());
                }
                _ => {
                    tracing::debug!("Environment variable {} is not set", var);
                    self.api_key = None;
                }
            }
        }
    }

    /// Effective credential, if one is configured and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty() && placeholder_name(k).is_none())
    }

    /// Request timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("generator.model must not be empty".to_string());
        }
        if self.endpoint.trim().is_empty() {
            return Err("generator.endpoint must not be empty".to_string());
        }
        if self.max_tokens == 0 || self.max_tokens > 200_000 {
            return Err(format!(
                "generator.max_tokens must be between 1 and 200000 (got {})",
                self.max_tokens
            ));
        }
        if let Some(temp) = self.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(format!(
                    "generator.temperature must be between 0.0 and 2.0 (got {})",
                    temp
                ));
            }
        }
        if let Some(timeout) = self.timeout_secs {
            if timeout == 0 || timeout > 600 {
                return Err(format!(
                    "generator.timeout_secs must be between 1 and 600 (got {})",
                    timeout
                ));
            }
        }
        Ok(())
    }
}

fn placeholder_name(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, 4096);
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unexpanded_placeholder_is_not_a_credential() {
        let config = GeneratorConfig::default();
        assert_eq!(config.api_key.as_deref(), Some("${ANTHROPIC_API_KEY}"));
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("STRATGEN_TEST_KEY_SET", "sk-ant-test-123");
        let mut config = GeneratorConfig {
            api_key: Some("${STRATGEN_TEST_KEY_SET}".to_string()),
            ..GeneratorConfig::default()
        };
        config.expand_env_vars();
        assert_eq!(config.credential(), Some("sk-ant-test-123"));

        let mut config = GeneratorConfig {
            api_key: Some("${STRATGEN_TEST_KEY_UNSET_0F3A}".to_string()),
            ..GeneratorConfig::default()
        };
        config.expand_env_vars();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_literal_key_kept() {
        let mut config = GeneratorConfig {
            api_key: Some("sk-ant-literal".to_string()),
            ..GeneratorConfig::default()
        };
        config.expand_env_vars();
        assert_eq!(config.credential(), Some("sk-ant-literal"));
    }

    #[test]
    fn test_validate_ranges() {
        let mut config = GeneratorConfig::default();
        config.temperature = Some(2.5);
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = GeneratorConfig::default();
        config.timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_offline_disables_service() {
        let config = GeneratorConfig::offline();
        assert!(!config.enabled);
        assert!(config.credential().is_none());
    }
}
