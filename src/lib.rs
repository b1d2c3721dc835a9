// Stratgen: AI-assisted QuantConnect strategy generation
// Copyright (c) 2024 Stratgen Core Team

//! # Stratgen Library
//!
//! Turns natural-language trading ideas into QuantConnect Lean algorithms.
//! A description goes through the generation client (service or built-in
//! skeleton), is checked by the validator, and valid programs are written
//! with a JSON metadata sidecar.
//!
//! ```no_run
//! use stratgen::prelude::*;
//!
//! # async fn demo() -> stratgen::Result<()> {
//! // ~/.stratgen/config.yaml if present, with ${ANTHROPIC_API_KEY} resolved
//! let config = Config::load(None)?;
//! let pipeline = Pipeline::from_config(&config);
//! let report = pipeline.run_batch(&["SMA crossover on SPY"]).await;
//! println!("{} saved", report.saved());
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

pub mod ai;
pub mod banner;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use crate::ai::{
    FallbackGenerator, GenerationClient, GenerationOptions, GeneratorConfig, LLMProvider,
    StrategyValidator,
};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::pipeline::{BatchReport, Outcome, Pipeline};
pub use crate::store::{ArtifactStore, StrategyMetadata};
pub use crate::types::{ArtifactOrigin, Dialect, GeneratedArtifact, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{GenerationClient, StrategyValidator};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::pipeline::{BatchItem, BatchReport, Outcome, Pipeline};
    pub use crate::store::ArtifactStore;
    pub use crate::types::{Dialect, GeneratedArtifact, ValidationReport};
}
