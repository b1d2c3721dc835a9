//! Configuration management for stratgen

use crate::ai::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::types::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Generation service configuration
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file, format chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid YAML config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid TOML config: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("Invalid JSON config: {}", e)))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };

        config.generator.expand_env_vars();
        Ok(config)
    }

    /// Load the explicit file if given, else `~/.stratgen/config.yaml` when it
    /// exists, else the defaults. Placeholders are resolved in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = Self::default_path().filter(|p| p.exists()) {
            tracing::debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        let mut config = Self::default();
        config.generator.expand_env_vars();
        Ok(config)
    }

    /// Default per-user configuration path
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".stratgen").join("config.yaml"))
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)
                .map_err(|e| Error::config(format!("Failed to serialize to YAML: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize to TOML: {}", e)))?,
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize to JSON: {}", e)))?,
            _ => return Err(Error::config("Unsupported config file format")),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.generator.validate().map_err(Error::Config)?;

        let lint = &self.validation.lint;
        if lint.timeout_secs == 0 || lint.timeout_secs > 600 {
            return Err(Error::config(format!(
                "validation.lint.timeout_secs must be between 1 and 600 (got {})",
                lint.timeout_secs
            )));
        }
        for (dialect, command) in [(Dialect::Python, &lint.python), (Dialect::CSharp, &lint.csharp)] {
            if let Some(command) = command {
                if command.first().map_or(true, |program| program.trim().is_empty()) {
                    return Err(Error::config(format!(
                        "validation.lint.{} must name a program",
                        dialect
                    )));
                }
            }
        }

        let prefix = self.output.stem_prefix.trim();
        if prefix.is_empty() {
            return Err(Error::config("output.stem_prefix must not be empty"));
        }
        if prefix.contains(['/', '\\']) || prefix.contains("..") {
            return Err(Error::config(
                "output.stem_prefix must not contain path separators",
            ));
        }

        Ok(())
    }
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Advisory linter settings
    #[serde(default)]
    pub lint: LintConfig,
}

/// Advisory linter configuration
///
/// Each command is the program followed by its arguments; the path of the
/// temporary source file is appended as the final argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintConfig {
    /// Run the advisory linter at all
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Linter for Python sources
    #[serde(default = "default_python_lint")]
    pub python: Option<Vec<String>>,
    /// Linter for C# sources
    #[serde(default)]
    pub csharp: Option<Vec<String>>,
    /// Upper bound on a single linter run
    #[serde(default = "default_lint_timeout")]
    pub timeout_secs: u64,
}

impl LintConfig {
    /// Disabled linter
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Linter command for a dialect, if one is configured
    pub fn command_for(&self, dialect: Dialect) -> Option<&[String]> {
        match dialect {
            Dialect::Python => self.python.as_deref(),
            Dialect::CSharp => self.csharp.as_deref(),
        }
    }

    /// Linter timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            python: default_python_lint(),
            csharp: None,
            timeout_secs: default_lint_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving source files and sidecars
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Dialect requested for every prompt in a batch
    #[serde(default)]
    pub dialect: Dialect,
    /// Record stems are `<prefix>_<index>`
    #[serde(default = "default_stem_prefix")]
    pub stem_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            dialect: Dialect::Python,
            stem_prefix: default_stem_prefix(),
        }
    }
}

/// Helper function for serde default = true
fn default_true() -> bool {
    true
}

fn default_python_lint() -> Option<Vec<String>> {
    Some(vec!["pylint".to_string(), "--score=yes".to_string()])
}

fn default_lint_timeout() -> u64 {
    10
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_stem_prefix() -> String {
    "strategy".to_string()
}
