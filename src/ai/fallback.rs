//! Deterministic fallback generator
//!
//! Used whenever the generation service is unavailable or returns nothing
//! usable. Renders an embedded skeleton with the description as a doc
//! comment, so the output always satisfies every structural rule.

use crate::types::{Dialect, GeneratedArtifact};

/// Skeleton templates embedded at compile-time
mod embedded_skeletons {
    pub const PYTHON: &str = include_str!("../../templates/skeleton/python-strategy.py");
    pub const CSHARP: &str = include_str!("../../templates/skeleton/csharp-strategy.cs");
}

const PLACEHOLDER: &str = "{{DESCRIPTION}}";
const EMPTY_DESCRIPTION: &str = "Generated strategy";

/// Renders skeleton strategies
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    /// Create a generator
    pub fn new() -> Self {
        Self
    }

    /// Raw skeleton for a dialect
    pub fn skeleton(dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Python => embedded_skeletons::PYTHON,
            Dialect::CSharp => embedded_skeletons::CSHARP,
        }
    }

    /// Render the skeleton source for a description
    pub fn render(&self, description: &str, dialect: Dialect) -> String {
        let doc = match dialect {
            Dialect::Python => python_docstring_body(description),
            Dialect::CSharp => csharp_doc_lines(description),
        };
        Self::skeleton(dialect).replacen(PLACEHOLDER, &doc, 1)
    }

    /// Produce a fallback artifact. Never fails.
    pub fn generate(&self, description: &str, dialect: Dialect) -> GeneratedArtifact {
        GeneratedArtifact::from_template(self.render(description, dialect), description, dialect)
    }
}

/// Description split on every line terminator either dialect knows
/// (`\r\n`, `\n`, `\r`, NEL, LS, PS), with control characters blanked
/// and trailing whitespace removed.
fn description_lines(description: &str) -> Vec<String> {
    let mut lines: Vec<String> = description
        .replace("\r\n", "\n")
        .split(['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}'])
        .map(|line| {
            line.chars()
                .map(|c| if c.is_control() && c != '\t' { ' ' } else { c })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn is_blank(lines: &[String]) -> bool {
    lines.iter().all(|l| l.trim().is_empty())
}

/// Docstring body indented to sit under the class statement
fn python_docstring_body(description: &str) -> String {
    let lines = description_lines(description);
    if is_blank(&lines) {
        return EMPTY_DESCRIPTION.to_string();
    }
    let escaped: Vec<String> = lines
        .iter()
        .map(|line| line.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\""))
        .collect();
    let mut body = escaped.join("\n    ");
    // A trailing quote would fuse with the closing delimiter
    if body.ends_with('"') {
        body.push(' ');
    }
    body
}

/// `///` lines inside the `<summary>` element
fn csharp_doc_lines(description: &str) -> String {
    let lines = description_lines(description);
    if is_blank(&lines) {
        return format!("    /// {}", EMPTY_DESCRIPTION);
    }
    lines
        .iter()
        .map(|line| {
            let escaped = line
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            format!("    /// {}", escaped)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
