//! Core type definitions for stratgen

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Strategy authoring dialect understood by the trading engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Python algorithms (primary dialect)
    #[default]
    Python,
    /// C# algorithms (secondary dialect)
    CSharp,
}

impl Dialect {
    /// All supported dialects
    pub const ALL: [Dialect; 2] = [Dialect::Python, Dialect::CSharp];

    /// File extension used when persisting source in this dialect
    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Python => "py",
            Dialect::CSharp => "cs",
        }
    }

    /// Human readable name, used when talking to the generation service
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::Python => "Python",
            Dialect::CSharp => "C#",
        }
    }

    /// Language tags that may open a fenced block of this dialect
    pub fn fence_tags(&self) -> &'static [&'static str] {
        match self {
            Dialect::Python => &["python", "py", "python3"],
            Dialect::CSharp => &["csharp", "cs", "c#"],
        }
    }

    /// Detect the dialect from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Dialect::Python),
            "cs" => Some(Dialect::CSharp),
            _ => None,
        }
    }

    /// Detect the dialect from a file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::Python => write!(f, "python"),
            Dialect::CSharp => write!(f, "csharp"),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Dialect::Python),
            "csharp" | "cs" | "c#" => Ok(Dialect::CSharp),
            other => Err(Error::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Where the source of an artifact came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ArtifactOrigin {
    /// Produced by the external generation service
    Service {
        /// Provider name (e.g. "anthropic")
        provider: String,
        /// Model identifier
        model: String,
    },
    /// Produced by the deterministic fallback template
    Fallback,
}

impl ArtifactOrigin {
    /// True when the fallback template produced the source
    pub fn is_fallback(&self) -> bool {
        matches!(self, ArtifactOrigin::Fallback)
    }
}

impl std::fmt::Display for ArtifactOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactOrigin::Service { provider, model } => write!(f, "{}/{}", provider, model),
            ArtifactOrigin::Fallback => write!(f, "fallback"),
        }
    }
}

/// A generated strategy program, immutable once created
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    source_code: String,
    description: String,
    dialect: Dialect,
    created_at: DateTime<Utc>,
    origin: ArtifactOrigin,
}

impl GeneratedArtifact {
    /// Create an artifact stamped with the current time.
    ///
    /// Returns `None` when `source_code` is blank after trimming, so callers
    /// are forced to pick another source instead of storing an empty program.
    pub fn new(
        source_code: impl Into<String>,
        description: impl Into<String>,
        dialect: Dialect,
        origin: ArtifactOrigin,
    ) -> Option<Self> {
        let source_code = source_code.into().trim().to_string();
        if source_code.is_empty() {
            return None;
        }
        Some(Self {
            source_code,
            description: description.into(),
            dialect,
            created_at: Utc::now(),
            origin,
        })
    }

    /// Artifact rendered from an embedded skeleton, which is never blank
    pub(crate) fn from_template(
        source_code: String,
        description: impl Into<String>,
        dialect: Dialect,
    ) -> Self {
        debug_assert!(!source_code.trim().is_empty());
        Self {
            source_code: source_code.trim().to_string(),
            description: description.into(),
            dialect,
            created_at: Utc::now(),
            origin: ArtifactOrigin::Fallback,
        }
    }

    /// Generated program text
    pub fn source_code(&self) -> &str {
        &self.source_code
    }

    /// Prompt the artifact was generated from, verbatim
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Requested dialect
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Generation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Provenance of the source
    pub fn origin(&self) -> &ArtifactOrigin {
        &self.origin
    }
}

/// Outcome of validating one program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    is_valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    score: i32,
}

impl ValidationReport {
    /// Score of a program with no findings
    pub const MAX_SCORE: i32 = 100;

    /// Build a report; validity follows from `errors` and the score is clamped.
    pub fn new(errors: Vec<String>, warnings: Vec<String>, score: i32) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
            score: score.clamp(0, Self::MAX_SCORE),
        }
    }

    /// True iff there are no errors
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Hard failures, in rule order
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Soft issues, in rule order
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Quality score in `0..=100`
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Consume the report, returning its errors and warnings
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.errors, self.warnings)
    }
}
