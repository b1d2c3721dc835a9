//! LLM Provider Abstraction Layer
//!
//! This module defines the `LLMProvider` trait the generation client talks
//! to. Only the Anthropic Messages API is implemented; anything else that can
//! turn an instruction into text can be plugged in behind the same trait.
//!
//! # Example
//!
//! ```no_run
//! use stratgen::ai::providers::{GenerationOptions, LLMProvider};
//!
//! async fn ask<P: LLMProvider>(provider: &P) -> anyhow::Result<()> {
//!     if !provider.is_available() {
//!         anyhow::bail!("Provider {} is not available", provider.name());
//!     }
//!
//!     let text = provider
//!         .generate(
//!             Some("You are an expert QuantConnect developer."),
//!             "Write a moving average crossover in Python.",
//!             &GenerationOptions::default(),
//!         )
//!         .await?;
//!
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

use crate::ai::config::GeneratorConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod anthropic;

pub use anthropic::AnthropicProvider;

/// Options for controlling LLM generation behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum number of tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature (0.0-2.0); provider default when unset
    pub temperature: Option<f32>,

    /// Request timeout; no bound when unset
    pub timeout: Option<Duration>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: None,
            timeout: None,
        }
    }
}

impl From<&GeneratorConfig> for GenerationOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout(),
        }
    }
}

/// Main trait that all LLM providers must implement
///
/// Implementors must be `Send + Sync` so a single provider can be shared by
/// the generation client across tasks.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Provider's unique lowercase name, e.g. "anthropic"
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Quick local check that the provider is usable (credential present and
    /// well formed). Must not touch the network.
    fn is_available(&self) -> bool;

    /// Send one request and return the first text block of the reply.
    ///
    /// # Errors
    ///
    /// Network failures, non-success HTTP statuses, malformed bodies and
    /// replies without any text content.
    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String>;
}

/// Build the provider named in the configuration.
///
/// Returns `None` when the service is disabled, the provider is unknown, or
/// no usable credential is configured.
pub fn from_config(config: &GeneratorConfig) -> Option<Box<dyn LLMProvider>> {
    if !config.enabled {
        tracing::debug!("Generation service disabled in configuration");
        return None;
    }

    let Some(api_key) = config.credential() else {
        tracing::info!("No API key configured, using fallback templates");
        return None;
    };

    match config.provider.as_str() {
        "anthropic" => {
            match AnthropicProvider::with_endpoint(
                api_key.to_string(),
                config.model.clone(),
                config.endpoint.clone(),
            ) {
                Ok(provider) if provider.is_available() => Some(Box::new(provider)),
                Ok(_) => {
                    tracing::warn!("Anthropic API key is malformed, using fallback templates");
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize Anthropic provider: {:#}", e);
                    None
                }
            }
        }
        other => {
            tracing::warn!("Unknown provider '{}', using fallback templates", other);
            None
        }
    }
}
