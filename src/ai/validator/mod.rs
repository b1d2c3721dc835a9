//! Strategy validation with per-dialect rule sets
//!
//! Validation runs in two stages:
//! - structural rules for the dialect, pure substring checks that decide
//!   validity and score
//! - an optional advisory linter that can only add a warning
//!
//! Every rule is evaluated; none short-circuits the others.

use crate::config::LintConfig;
use crate::types::{Dialect, ValidationReport};
use serde::{Deserialize, Serialize};

mod csharp;
pub mod lint;
mod python;

pub use lint::AdvisoryLinter;

/// Severity of a validation diagnostic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Invalidates the program
    Error,
    /// Lowers the score by the diagnostic's penalty
    Warning,
}

/// One finding produced by a rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StrategyDiagnostic {
    /// Severity
    pub severity: DiagnosticSeverity,
    /// Stable rule identifier, e.g. `python.missing_on_data`
    pub code: String,
    /// Message shown to users and stored in reports
    pub message: String,
    /// Points taken off the score
    pub penalty: i32,
}

impl StrategyDiagnostic {
    /// Hard failure
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            message: message.into(),
            penalty: 0,
        }
    }

    /// Soft issue with no score impact
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            message: message.into(),
            penalty: 0,
        }
    }

    /// Set the score penalty
    pub fn with_penalty(mut self, penalty: i32) -> Self {
        self.penalty = penalty;
        self
    }
}

/// Fold diagnostics, in order, into a report
pub fn build_report(diagnostics: &[StrategyDiagnostic]) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut score = ValidationReport::MAX_SCORE;

    for diagnostic in diagnostics {
        match diagnostic.severity {
            DiagnosticSeverity::Error => errors.push(diagnostic.message.clone()),
            DiagnosticSeverity::Warning => warnings.push(diagnostic.message.clone()),
        }
        score -= diagnostic.penalty;
    }

    ValidationReport::new(errors, warnings, score)
}

/// Validator for generated strategies
#[derive(Debug, Clone, Default)]
pub struct StrategyValidator {
    linter: Option<AdvisoryLinter>,
}

impl StrategyValidator {
    /// Validator running structural rules only
    pub fn new() -> Self {
        Self { linter: None }
    }

    /// Validator that also consults the advisory linter when it is enabled
    pub fn with_lint_config(config: &LintConfig) -> Self {
        Self {
            linter: config.enabled.then(|| AdvisoryLinter::from_config(config)),
        }
    }

    /// Attach an explicit linter
    pub fn with_linter(mut self, linter: AdvisoryLinter) -> Self {
        self.linter = Some(linter);
        self
    }

    /// Whether an advisory linter is attached
    pub fn has_linter(&self) -> bool {
        self.linter.is_some()
    }

    /// Structural diagnostics for the dialect, in rule order
    pub fn diagnostics(&self, source: &str, dialect: Dialect) -> Vec<StrategyDiagnostic> {
        match dialect {
            Dialect::Python => python::check(source),
            Dialect::CSharp => csharp::check(source),
        }
    }

    /// Apply the structural rules only. Pure and deterministic.
    pub fn check_rules(&self, source: &str, dialect: Dialect) -> ValidationReport {
        build_report(&self.diagnostics(source, dialect))
    }

    /// Apply the structural rules, then the advisory linter if attached
    pub async fn validate(&self, source: &str, dialect: Dialect) -> ValidationReport {
        let mut diagnostics = self.diagnostics(source, dialect);

        if let Some(linter) = &self.linter {
            if let Some(advisory) = linter.check(source, dialect).await {
                diagnostics.push(advisory);
            }
        }

        let report = build_report(&diagnostics);
        tracing::debug!(
            "Validated {} source: valid={}, score={}, {} error(s), {} warning(s)",
            dialect,
            report.is_valid(),
            report.score(),
            report.errors().len(),
            report.warnings().len()
        );
        report
    }
}
