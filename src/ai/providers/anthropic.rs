//! Anthropic LLM Provider Implementation
//!
//! Talks to the Messages API. Requires an API key from
//! https://console.anthropic.com/ exported as `ANTHROPIC_API_KEY` (or set in
//! the configuration file).

use super::{GenerationOptions, LLMProvider};
use crate::ai::config::DEFAULT_ENDPOINT;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Anthropic API version to use
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Anthropic provider for Claude models
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl AnthropicProvider {
    /// Create a provider for the public API endpoint
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_endpoint(api_key, model, DEFAULT_ENDPOINT.to_string())
    }

    /// Create a provider for a custom base URL (proxies, test servers)
    pub fn with_endpoint(api_key: String, model: String, endpoint: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
            client,
        })
    }

    /// Base URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if API key appears valid (starts with sk-ant-)
    fn is_api_key_valid(&self) -> bool {
        !self.api_key.is_empty()
            && !self.api_key.starts_with("${")
            && self.api_key.starts_with("sk-ant-")
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.is_api_key_valid()
    }

    async fn generate(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        info!("Generating with Anthropic model: {}", self.model);
        debug!("Prompt length: {} chars", prompt.len());

        if !self.is_api_key_valid() {
            anyhow::bail!(
                "Invalid Anthropic API key. Get your key from: https://console.anthropic.com/"
            );
        }

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: options.max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
        };

        let mut builder = self
            .client
            .post(format!("{}/messages", self.endpoint))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder
            .send()
            .await
            .context("Failed to connect to Anthropic API")?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);

            warn!("Anthropic rate limit hit, retry after {} seconds", retry_after);
            anyhow::bail!("Anthropic rate limit exceeded (retry after {}s)", retry_after);
        }

        if status.as_u16() == 401 {
            anyhow::bail!("Anthropic authentication failed. Check your API key");
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error {}: {}", status, error_text);
        }

        let response_data: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic response")?;

        if let Some(usage) = &response_data.usage {
            debug!(
                "Token usage - Input: {}, Output: {}",
                usage.input_tokens, usage.output_tokens
            );
        }

        if response_data.stop_reason.as_deref() == Some("max_tokens") {
            warn!("Response was truncated due to max_tokens limit");
        }

        let text = response_data
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .context("Anthropic returned no text content")?;

        info!("Generation completed, {} chars", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> AnthropicProvider {
        AnthropicProvider::with_endpoint(
            "sk-ant-test123".to_string(),
            "claude-sonnet-4-20250514".to_string(),
            server.uri(),
        )
        .unwrap()
    }

    #[test]
    fn test_anthropic_provider_creation() {
        let provider =
            AnthropicProvider::new("sk-ant-test123".to_string(), "m".to_string()).unwrap();

        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "m");
        assert_eq!(provider.endpoint(), DEFAULT_ENDPOINT);
        assert!(provider.is_available());
    }

    #[test]
    fn test_api_key_validation() {
        for bad in ["", "${ANTHROPIC_API_KEY}", "sk-wrong-prefix", "invalid-key"] {
            let provider = AnthropicProvider::new(bad.to_string(), "m".to_string()).unwrap();
            assert!(!provider.is_available(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_endpoint_trailing_slash_trimmed() {
        let provider = AnthropicProvider::with_endpoint(
            "sk-ant-x".to_string(),
            "m".to_string(),
            "http://localhost:9/v1/".to_string(),
        )
        .unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9/v1");
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_returns_first_text_block() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "sk-ant-test123"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 4096,
                "system": "be precise",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "text", "text": "first"},
                    {"type": "text", "text": "second"}
                ],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 3, "output_tokens": 1}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .generate(Some("be precise"), "hello", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "first");
    }

    #[tokio::test]
    async fn test_generate_skips_non_text_blocks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": [
                    {"type": "thinking", "thinking": "..."},
                    {"type": "text", "text": "answer"}
                ]
            })))
            .mount(&server)
            .await;

        let text = provider_for(&server)
            .generate(None, "q", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "answer");
    }

    #[tokio::test]
    async fn test_generate_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(None, "q", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .generate(None, "q", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("retry after 7s"));
    }

    #[tokio::test]
    async fn test_generate_without_text_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "content": [] })),
            )
            .mount(&server)
            .await;

        assert!(provider_for(&server)
            .generate(None, "q", &GenerationOptions::default())
            .await
            .is_err());
    }
}
