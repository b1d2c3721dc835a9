//! Response parser for generated strategy code
//!
//! Services usually wrap code in a markdown fence, sometimes with prose around
//! it. The parser keeps only the content of the first fence (or the whole text
//! when there is none), drops a bare language tag line, and trims.

use crate::types::Dialect;
use anyhow::Result;
use regex::Regex;

/// Parser for service responses containing strategy code
#[derive(Debug, Clone)]
pub struct ResponseParser {
    /// First fenced block; an unclosed fence runs to the end of the text
    fence: Regex,
}

impl ResponseParser {
    /// Create a new ResponseParser with compiled regexes
    pub fn new() -> Self {
        Self {
            fence: Regex::new(r"(?s)```(.*?)(?:```|\z)").expect("fence pattern is valid"),
        }
    }

    /// Extract clean source code from a raw response.
    ///
    /// Fails when nothing but whitespace is left.
    pub fn parse(&self, response: &str, dialect: Dialect) -> Result<String> {
        tracing::debug!("Parsing response ({} chars) for {}", response.len(), dialect);
        tracing::trace!("Raw response: {}", response);

        let body = match self.fence.captures(response).and_then(|c| c.get(1)) {
            Some(inner) => Self::strip_tag_line(inner.as_str(), dialect),
            None => response,
        };

        let code = body.trim();
        if code.is_empty() {
            anyhow::bail!("Response contained no code");
        }

        tracing::debug!("Extracted {} chars of code", code.len());
        Ok(code.to_string())
    }

    /// Drop the first line when it is nothing but a language tag.
    ///
    /// A tag of the other dialect is dropped too; a lone `python` line is
    /// never valid C# and vice versa.
    fn strip_tag_line(block: &str, dialect: Dialect) -> &str {
        let (first, rest) = match block.split_once('\n') {
            Some((first, rest)) => (first, rest),
            None => (block, ""),
        };

        let tag = first.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return rest;
        }

        let is_tag = dialect.fence_tags().contains(&tag.as_str())
            || Dialect::ALL
                .iter()
                .filter(|d| **d != dialect)
                .any(|d| d.fence_tags().contains(&tag.as_str()));

        if is_tag {
            rest
        } else {
            block
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}
