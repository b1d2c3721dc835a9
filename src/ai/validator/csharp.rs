//! C# (secondary dialect) structural rules

use super::StrategyDiagnostic;

/// Run every C# rule, in order
pub fn check(code: &str) -> Vec<StrategyDiagnostic> {
    let mut diagnostics = Vec::new();

    if !code.contains("Initialize()") {
        diagnostics.push(StrategyDiagnostic::error(
            "csharp.missing_initialize",
            "Missing Initialize method",
        ));
    }

    if !code.contains("QCAlgorithm") {
        diagnostics.push(StrategyDiagnostic::error(
            "csharp.missing_base_class",
            "Missing QCAlgorithm base class",
        ));
    }

    diagnostics
}
