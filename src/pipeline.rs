//! Batch pipeline: generate, validate, persist
//!
//! Prompts are processed one after another. Each item ends in exactly one
//! [`Outcome`]; a failure in one item never stops the batch.

use crate::ai::{GenerationClient, StrategyValidator};
use crate::config::Config;
use crate::store::ArtifactStore;
use crate::types::Dialect;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Prompts used when a batch is started without any
pub const DEFAULT_PROMPTS: [&str; 3] = [
    "Create a momentum strategy using RSI that buys when RSI < 30 and sells when RSI > 70",
    "Build a mean reversion strategy using Bollinger Bands",
    "Design a trend following strategy with MACD crossover signals",
];

/// Result of one batch item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// Valid and written to disk
    Saved {
        /// Source file path
        path: PathBuf,
        /// Validation score
        score: i32,
        /// Validation warnings
        warnings: Vec<String>,
    },
    /// Failed structural validation; nothing written
    Rejected {
        /// Validation errors
        errors: Vec<String>,
    },
    /// Valid but could not be written
    Failed {
        /// Why the record could not be written
        error: String,
    },
}

impl Outcome {
    /// True for `Saved`
    pub fn is_saved(&self) -> bool {
        matches!(self, Outcome::Saved { .. })
    }
}

/// One processed prompt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    /// 1-based position in the batch
    pub index: usize,
    /// Prompt text
    pub prompt: String,
    /// What happened
    pub outcome: Outcome,
}

/// Ordered outcomes of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    /// Items in input order
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    /// Number of saved items
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Saved { .. }))
    }

    /// Number of rejected items
    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Rejected { .. }))
    }

    /// Number of items that failed to persist
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// True when every item was saved
    pub fn all_saved(&self) -> bool {
        self.items.iter().all(|item| item.outcome.is_saved())
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

/// Generation, validation and persistence wired together
#[derive(Debug)]
pub struct Pipeline {
    client: GenerationClient,
    validator: StrategyValidator,
    store: ArtifactStore,
    dialect: Dialect,
    stem_prefix: String,
}

impl Pipeline {
    /// Assemble a pipeline from parts
    pub fn new(client: GenerationClient, validator: StrategyValidator, store: ArtifactStore) -> Self {
        Self {
            client,
            validator,
            store,
            dialect: Dialect::Python,
            stem_prefix: "strategy".to_string(),
        }
    }

    /// Assemble a pipeline from configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            GenerationClient::new(&config.generator),
            StrategyValidator::with_lint_config(&config.validation.lint),
            ArtifactStore::new(&config.output.directory),
        )
        .with_dialect(config.output.dialect)
        .with_stem_prefix(&config.output.stem_prefix)
    }

    /// Dialect requested for every prompt
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Record stems become `<prefix>_<index>`
    pub fn with_stem_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.stem_prefix = prefix.into();
        self
    }

    /// Requested dialect
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// True when the generation service will be asked before the fallback
    pub fn is_online(&self) -> bool {
        self.client.is_online()
    }

    /// Destination store
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run a batch
    pub async fn run_batch<S: AsRef<str>>(&self, prompts: &[S]) -> BatchReport {
        self.run_batch_with(prompts, |_| {}).await
    }

    /// Run a batch, calling `on_item` as each item finishes
    pub async fn run_batch_with<S, F>(&self, prompts: &[S], mut on_item: F) -> BatchReport
    where
        S: AsRef<str>,
        F: FnMut(&BatchItem),
    {
        let mut report = BatchReport::default();

        for (offset, prompt) in prompts.iter().enumerate() {
            let index = offset + 1;
            let prompt = prompt.as_ref();
            info!("Processing prompt {}/{}", index, prompts.len());

            let outcome = self.process(index, prompt).await;
            let item = BatchItem {
                index,
                prompt: prompt.to_string(),
                outcome,
            };
            on_item(&item);
            report.items.push(item);
        }

        info!(
            "Batch finished: {} saved, {} rejected, {} failed",
            report.saved(),
            report.rejected(),
            report.failed()
        );
        report
    }

    async fn process(&self, index: usize, prompt: &str) -> Outcome {
        let artifact = self.client.generate(prompt, self.dialect).await;
        let report = self.validator.validate(artifact.source_code(), self.dialect).await;
        let score = report.score();

        if !report.is_valid() {
            let (errors, _) = report.into_parts();
            warn!("Prompt {} rejected: {}", index, errors.join("; "));
            return Outcome::Rejected { errors };
        }

        let stem = format!("{}_{}", self.stem_prefix, index);
        match self.store.persist(&artifact, &stem) {
            Ok(path) => {
                let (_, warnings) = report.into_parts();
                info!("Saved {} (score {})", path.display(), score);
                Outcome::Saved {
                    path,
                    score,
                    warnings,
                }
            }
            Err(e) => {
                if e.is_storage() {
                    warn!("Prompt {} could not be saved: {}", index, e);
                } else {
                    // Not a disk fault; the record name or metadata itself is broken
                    error!("Prompt {} has an unusable record: {}", index, e);
                }
                Outcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
