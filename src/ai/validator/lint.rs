//! Advisory linting through an external tool
//!
//! The source is written to a scoped temporary file which is handed to the
//! configured command as its last argument. A non-zero exit adds a single
//! warning. Missing tools, spawn failures and timeouts add nothing.

use super::StrategyDiagnostic;
use crate::config::LintConfig;
use crate::types::Dialect;
use anyhow::{Context, Result};
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Message recorded when the linter reports problems
pub const LINT_WARNING: &str = "Linting issues found";

/// Runs an external linter over generated source
#[derive(Debug, Clone)]
pub struct AdvisoryLinter {
    python: Option<Vec<String>>,
    csharp: Option<Vec<String>>,
    timeout: Duration,
}

impl Default for AdvisoryLinter {
    fn default() -> Self {
        Self::from_config(&LintConfig::default())
    }
}

impl AdvisoryLinter {
    /// Build from configuration
    pub fn from_config(config: &LintConfig) -> Self {
        Self {
            python: config.python.clone(),
            csharp: config.csharp.clone(),
            timeout: config.timeout(),
        }
    }

    /// Override the command for one dialect
    pub fn with_command(mut self, dialect: Dialect, command: Vec<String>) -> Self {
        match dialect {
            Dialect::Python => self.python = Some(command),
            Dialect::CSharp => self.csharp = Some(command),
        }
        self
    }

    /// Override the wait bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command_for(&self, dialect: Dialect) -> Option<&[String]> {
        match dialect {
            Dialect::Python => self.python.as_deref(),
            Dialect::CSharp => self.csharp.as_deref(),
        }
    }

    /// Lint `source`; returns the advisory warning when the tool flags it
    pub async fn check(&self, source: &str, dialect: Dialect) -> Option<StrategyDiagnostic> {
        let command = self.command_for(dialect)?;

        match self.run(command, source, dialect).await {
            Ok(true) => None,
            Ok(false) => Some(StrategyDiagnostic::warning("lint.issues", LINT_WARNING)),
            Err(e) => {
                tracing::debug!("Advisory lint skipped: {:#}", e);
                None
            }
        }
    }

    /// Run the tool; `Ok(true)` when it exited successfully
    async fn run(&self, command: &[String], source: &str, dialect: Dialect) -> Result<bool> {
        let (program, args) = command.split_first().context("Empty lint command")?;

        let mut file = tempfile::Builder::new()
            .prefix("stratgen-lint-")
            .suffix(&format!(".{}", dialect.extension()))
            .tempfile()
            .context("Failed to create temporary source file")?;
        file.write_all(source.as_bytes())
            .and_then(|_| file.flush())
            .context("Failed to write temporary source file")?;

        tracing::debug!("Running {} on {}", program, file.path().display());

        let child = Command::new(program)
            .args(args)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", program))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("{} timed out after {:?}", program, self.timeout))?
            .with_context(|| format!("Failed to wait for {}", program))?;

        if !output.status.success() {
            tracing::trace!(
                "{} exited with {}:\n{}",
                program,
                output.status,
                String::from_utf8_lossy(&output.stdout)
            );
        }

        Ok(output.status.success())
    }
}
