//! Linter diagnostics.
//!
//! A [`Diagnostic`] is plain data: a severity-tagged message anchored to the
//! span of the node that triggered it. Diagnostics are accumulated by the
//! linter and never raised as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::Node;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// How serious a diagnostic is; ordered from least to most severe.
///
/// ```rust
/// use pythia::Severity;
/// assert!(Severity::Hint < Severity::Information);
/// assert!(Severity::Warning < Severity::Error);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Hint = 10,
    Information = 20,
    Warning = 30,
    Error = 40,
}

/// A single finding of the linter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub line: usize,
    pub end_line: usize,
    pub column: usize,
    pub end_column: usize,
    pub message: String,
    pub severity: Severity,
}

/// Machine-readable wrapper emitted by `pythia lint --json`.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport<'a> {
    pub diagnostics: &'a [Diagnostic],
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Hint => "HINT",
            Severity::Information => "INFORMATION",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl Diagnostic {
    /// Anchors `message` to the span of `node`.
    pub fn from_node(node: &Node, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            line: node.span.line,
            end_line: node.span.end_line(),
            column: node.span.column,
            end_column: node.span.end_column(),
            message: message.into(),
            severity,
        }
    }

    /// Shorthand for an [`Severity::Error`] diagnostic.
    pub fn error(node: &Node, message: impl Into<String>) -> Self {
        Self::from_node(node, message, Severity::Error)
    }

    pub fn is_error(&self) -> bool {
        self.severity >= Severity::Error
    }
}

impl<'a> DiagnosticReport<'a> {
    pub fn new(diagnostics: &'a [Diagnostic]) -> Self {
        Self { diagnostics }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>4}:{}: {}: {}",
            self.line, self.column, self.severity, self.message
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::name;

    #[test]
    fn renders_one_line_per_diagnostic() {
        let node = name("x").spanning(12, 4, 12, 5);
        let diagnostic = Diagnostic::error(&node, "Importing is prohibited");
        assert_eq!(diagnostic.to_string(), "  12:4: ERROR: Importing is prohibited");
    }

    #[test]
    fn missing_end_positions_fall_back_to_start() {
        let node = name("x").at(3, 7);
        let diagnostic = Diagnostic::from_node(&node, "m", Severity::Hint);
        assert_eq!((diagnostic.end_line, diagnostic.end_column), (3, 7));
    }

    #[test]
    fn severities_are_ordered() {
        let mut severities = vec![
            Severity::Error,
            Severity::Hint,
            Severity::Warning,
            Severity::Information,
        ];
        severities.sort();
        assert_eq!(
            severities,
            vec![
                Severity::Hint,
                Severity::Information,
                Severity::Warning,
                Severity::Error
            ]
        );
        assert_eq!(Severity::Warning as u8, 30);
    }

    #[test]
    fn report_serializes_severity_names() {
        let node = name("x").at(1, 0);
        let diagnostics = vec![Diagnostic::from_node(&node, "m", Severity::Warning)];
        let json = DiagnosticReport::new(&diagnostics).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"diagnostics":[{"line":1,"end_line":1,"column":0,"end_column":0,"message":"m","severity":"WARNING"}]}"#
        );
    }
}
