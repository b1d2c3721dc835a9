//! Generation client
//!
//! Wraps an optional `LLMProvider` and guarantees an artifact for every
//! request: any service fault, or a reply without usable code, falls back to
//! the embedded skeleton.

use super::config::GeneratorConfig;
use super::fallback::FallbackGenerator;
use super::parser::ResponseParser;
use super::prompt::PromptBuilder;
use super::providers::{self, GenerationOptions, LLMProvider};
use crate::types::{ArtifactOrigin, Dialect, GeneratedArtifact};
use anyhow::Result;
use tracing::{debug, info, warn};

/// Produces strategy artifacts from descriptions
pub struct GenerationClient {
    provider: Option<Box<dyn LLMProvider>>,
    options: GenerationOptions,
    prompts: PromptBuilder,
    parser: ResponseParser,
    fallback: FallbackGenerator,
}

impl std::fmt::Debug for GenerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("options", &self.options)
            .finish()
    }
}

impl GenerationClient {
    /// Client configured from settings. Construction never fails; an unusable
    /// provider configuration leaves the client in fallback-only mode.
    ///
    /// `${VAR}` placeholders still left in the API key are resolved here.
    pub fn new(config: &GeneratorConfig) -> Self {
        let mut config = config.clone();
        config.expand_env_vars();
        let config = &config;

        let provider = providers::from_config(config);
        match &provider {
            Some(p) => info!("Using {} model {}", p.name(), p.model()),
            None => info!("Generation service not configured, fallback templates will be used"),
        }

        Self {
            provider,
            options: GenerationOptions::from(config),
            prompts: PromptBuilder::new(),
            parser: ResponseParser::new(),
            fallback: FallbackGenerator::new(),
        }
    }

    /// Client that never contacts a service
    pub fn offline() -> Self {
        Self::new(&GeneratorConfig::offline())
    }

    /// Client around an explicit provider
    pub fn with_provider(provider: Box<dyn LLMProvider>, options: GenerationOptions) -> Self {
        Self {
            provider: Some(provider),
            options,
            prompts: PromptBuilder::new(),
            parser: ResponseParser::new(),
            fallback: FallbackGenerator::new(),
        }
    }

    /// Replace the prompt builder
    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// True when requests go to a generation service
    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    /// Generate an artifact for `prompt`. Never fails.
    pub async fn generate(&self, prompt: &str, dialect: Dialect) -> GeneratedArtifact {
        let Some(provider) = &self.provider else {
            debug!("No provider configured, rendering fallback");
            return self.fallback.generate(prompt, dialect);
        };

        match self.request(provider.as_ref(), prompt, dialect).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Generation via {} failed, using fallback: {:#}", provider.name(), e);
                self.fallback.generate(prompt, dialect)
            }
        }
    }

    async fn request(
        &self,
        provider: &dyn LLMProvider,
        prompt: &str,
        dialect: Dialect,
    ) -> Result<GeneratedArtifact> {
        let system = self.prompts.system_instruction(dialect);
        let user = self.prompts.user_instruction(prompt, dialect);

        let response = provider.generate(Some(&system), &user, &self.options).await?;
        let code = self.parser.parse(&response, dialect)?;

        let origin = ArtifactOrigin::Service {
            provider: provider.name().to_string(),
            model: provider.model().to_string(),
        };
        GeneratedArtifact::new(code, prompt, dialect, origin)
            .ok_or_else(|| anyhow::anyhow!("Service returned empty code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Scripted {
        reply: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LLMProvider for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn generate(
            &self,
            system: Option<&str>,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(system.is_some());
            assert!(prompt.contains("Provide only the code"));
            self.reply.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn client(reply: Result<&str, &str>) -> (GenerationClient, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Scripted {
            reply: reply.map(str::to_string).map_err(str::to_string),
            calls: calls.clone(),
        };
        (
            GenerationClient::with_provider(Box::new(provider), GenerationOptions::default()),
            calls,
        )
    }

    #[tokio::test]
    async fn test_offline_uses_fallback() {
        let client = GenerationClient::offline();
        assert!(!client.is_online());
        let artifact = client.generate("SMA crossover", Dialect::Python).await;
        assert!(artifact.origin().is_fallback());
        assert!(artifact.source_code().contains("def Initialize("));
        assert!(artifact.source_code().contains("def OnData("));
    }

    #[test]
    fn test_new_resolves_key_placeholder() {
        std::env::set_var("STRATGEN_CLIENT_KEY", "sk-ant-from-env");
        let config = GeneratorConfig {
            api_key: Some("${STRATGEN_CLIENT_KEY}".to_string()),
            ..GeneratorConfig::default()
        };
        assert!(GenerationClient::new(&config).is_online());

        let config = GeneratorConfig {
            api_key: Some("${STRATGEN_CLIENT_KEY_UNSET}".to_string()),
            ..GeneratorConfig::default()
        };
        assert!(!GenerationClient::new(&config).is_online());
    }

    #[tokio::test]
    async fn test_service_reply_is_parsed() {
        let (client, calls) =
            client(Ok("Here you go:\n```python\nclass A(QCAlgorithm):\n    pass\n```"));
        let artifact = client.generate("desc", Dialect::Python).await;
        assert_eq!(artifact.source_code(), "class A(QCAlgorithm):\n    pass");
        assert_eq!(artifact.description(), "desc");
        assert_eq!(
            artifact.origin(),
            &ArtifactOrigin::Service {
                provider: "scripted".to_string(),
                model: "scripted-1".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_error_falls_back_without_retry() {
        let (client, calls) = client(Err("connection refused"));
        let artifact = client.generate("desc", Dialect::CSharp).await;
        assert!(artifact.origin().is_fallback());
        assert_eq!(artifact.dialect(), Dialect::CSharp);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_falls_back() {
        let (client, _) = client(Ok("```python\n   \n```"));
        let artifact = client.generate("desc", Dialect::Python).await;
        assert!(artifact.origin().is_fallback());
        assert!(!artifact.source_code().is_empty());
    }
}
