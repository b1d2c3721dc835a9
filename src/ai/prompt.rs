//! Prompt construction for strategy generation
//!
//! Two messages are sent to the service: a system instruction that frames the
//! model as a QuantConnect Lean developer and lists what every algorithm must
//! contain, and a user instruction carrying the description verbatim.

use crate::types::Dialect;

const SYSTEM_INSTRUCTION: &str = "You are an expert QuantConnect Lean algorithm developer. \
Generate complete, production-ready trading strategy code based on the user's description.

Requirements:
- Proper initialization: start and end dates, starting cash, securities and indicators
- Clear comments explaining the trading logic
- Risk management: position sizing and stop losses
- Performance tracking through plots or logs
- Error handling around data access and order placement

Return a single complete algorithm file.";

/// Builds the instructions sent to the generation service
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    extra_requirements: Vec<String>,
}

impl PromptBuilder {
    /// Create a builder with the standard requirement list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a requirement line to the system instruction
    pub fn with_requirement(mut self, requirement: impl Into<String>) -> Self {
        self.extra_requirements.push(requirement.into());
        self
    }

    /// System instruction for a dialect
    pub fn system_instruction(&self, dialect: Dialect) -> String {
        let mut out = String::from(SYSTEM_INSTRUCTION);
        out.push_str("\n\n");
        out.push_str(Self::dialect_context(dialect));
        for requirement in &self.extra_requirements {
            out.push_str("\n- ");
            out.push_str(requirement);
        }
        out
    }

    /// User instruction embedding the description verbatim
    pub fn user_instruction(&self, description: &str, dialect: Dialect) -> String {
        format!(
            "Generate a QuantConnect Lean trading strategy in {} based on this description:\n\n\
             {}\n\n\
             Provide only the code without explanation.",
            dialect.display_name(),
            description
        )
    }

    fn dialect_context(dialect: Dialect) -> &'static str {
        match dialect {
            Dialect::Python => {
                "Python conventions:\n\
                 - Start with `from AlgorithmImports import *`\n\
                 - Define a class deriving from `QCAlgorithm`\n\
                 - Implement `def Initialize(self)` and `def OnData(self, data)`"
            }
            Dialect::CSharp => {
                "C# conventions:\n\
                 - Use the `QuantConnect.Algorithm.CSharp` namespace\n\
                 - Define a public class deriving from `QCAlgorithm`\n\
                 - Override `Initialize()` and `OnData(Slice data)`"
            }
        }
    }
}
