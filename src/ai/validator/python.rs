//! Python (primary dialect) structural rules

use super::StrategyDiagnostic;

/// Score lost when the data handler is missing
pub const MISSING_ON_DATA_PENALTY: i32 = 20;

/// Run every Python rule, in order
pub fn check(code: &str) -> Vec<StrategyDiagnostic> {
    let mut diagnostics = Vec::new();

    if !code.contains("AlgorithmImports") && !code.contains("QCAlgorithm") {
        diagnostics.push(StrategyDiagnostic::error(
            "python.missing_imports",
            "Missing QuantConnect imports",
        ));
    }

    if !code.contains("def Initialize(") {
        diagnostics.push(StrategyDiagnostic::error(
            "python.missing_initialize",
            "Missing Initialize method",
        ));
    }

    if !code.contains("def OnData(") {
        diagnostics.push(
            StrategyDiagnostic::warning("python.missing_on_data", "Missing OnData method")
                .with_penalty(MISSING_ON_DATA_PENALTY),
        );
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_codes() {
        let codes: Vec<_> = check("").into_iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            [
                "python.missing_imports",
                "python.missing_initialize",
                "python.missing_on_data"
            ]
        );
    }

    #[test]
    fn test_markers_are_case_sensitive() {
        let diagnostics = check("from AlgorithmImports import *\ndef initialize(self): pass");
        assert!(diagnostics.iter().any(|d| d.code == "python.missing_initialize"));
    }
}
