//! Error types for stratgen
//!
//! Faults from the generation service never surface here: the generation
//! client absorbs them into the fallback path. What remains is configuration,
//! storage and serialization trouble.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for stratgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for stratgen
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Record stem would escape the output directory or is empty
    #[error("Invalid record name '{stem}': {reason}")]
    InvalidStem {
        /// Offending stem
        stem: String,
        /// Why it was refused
        reason: String,
    },

    /// Persisting an artifact failed
    #[error("Failed to persist {path}: {message}")]
    Persistence {
        /// Path being written
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Unknown or unsupported strategy language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        /// Error context
        context: String,
        /// Source error
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error
    pub fn context<S: Into<String>>(self, context: S) -> Self {
        Error::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Create an invalid stem error
    pub fn invalid_stem<S: Into<String>, R: Into<String>>(stem: S, reason: R) -> Self {
        Error::InvalidStem {
            stem: stem.into(),
            reason: reason.into(),
        }
    }

    /// Create a persistence error
    pub fn persistence<P: Into<PathBuf>, M: Into<String>>(path: P, message: M) -> Self {
        Error::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if the error stems from the filesystem
    pub fn is_storage(&self) -> bool {
        match self {
            Error::Io(_) | Error::FileNotFound(_) | Error::Persistence { .. } => true,
            Error::WithContext { source, .. } => source.is_storage(),
            _ => false,
        }
    }
}

/// Trait for adding context to results
pub trait ResultExt<T> {
    /// Add context to the error
    fn context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (only called on error)
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}
