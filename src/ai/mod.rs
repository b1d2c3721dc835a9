//! AI-assisted strategy generation
//!
//! # Architecture
//!
//! - `GenerationClient`: total entry point, service first and fallback second
//! - `GeneratorConfig`: generation service settings
//! - `providers`: LLM provider implementations (Anthropic)
//! - `prompt`: system and user instructions
//! - `parser`: extraction of clean code from replies
//! - `fallback`: deterministic skeleton strategies
//! - `validator`: structural rules and the advisory linter
//!
//! # Example
//!
//! ```no_run
//! use stratgen::ai::{GenerationClient, GeneratorConfig, StrategyValidator};
//! use stratgen::types::Dialect;
//!
//! async fn generate() {
//!     let client = GenerationClient::new(&GeneratorConfig::default());
//!     let artifact = client.generate("RSI mean reversion on SPY", Dialect::Python).await;
//!
//!     let report = StrategyValidator::new()
//!         .validate(artifact.source_code(), artifact.dialect())
//!         .await;
//!     println!("valid={} score={}", report.is_valid(), report.score());
//! }
//! ```

pub mod client;
pub mod config;
pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod validator;

pub use client::GenerationClient;
pub use config::GeneratorConfig;
pub use fallback::FallbackGenerator;
pub use parser::ResponseParser;
pub use prompt::PromptBuilder;
pub use providers::{AnthropicProvider, GenerationOptions, LLMProvider};
pub use validator::{AdvisoryLinter, StrategyValidator};
