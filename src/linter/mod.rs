//! Rule-based linter for probabilistic programs.
//!
//! The linter walks a tree depth-first in one of two modes. Outside of any
//! entry point it only looks for entry points (and analyzes candidates);
//! inside one it applies every rule to every node. Once a rule fires on a
//! node, its children are skipped unless extensive diagnosis is enabled, so a
//! single malformed construct yields a single diagnostic.
//!
//! ```rust
//! use pythia::ast::builder::*;
//! use pythia::linter::default_linter;
//!
//! let tree = module(vec![model("m", &[], vec![pass()])]);
//! let diagnostics = default_linter().lint(&tree);
//! assert_eq!(diagnostics[0].message, "Pass statements are prohibited");
//! ```

// ============================================================================
// IMPORTS
// ============================================================================

use tracing::debug;

use crate::ast::Node;
use crate::diagnostics::Diagnostic;

pub mod entry_point;
pub mod rules;

pub use rules::Rule;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Decides whether a node starts code of interest.
pub type EntryPointPredicate = fn(&Node) -> bool;

/// Diagnoses a potential entry point before it is entered.
pub type EntryPointAnalysis = fn(&Node) -> Vec<Diagnostic>;

/// A linter over a fixed rule battery and entry-point definition.
#[derive(Debug, Clone)]
pub struct Linter {
    rules: Vec<Rule>,
    is_entry_point: EntryPointPredicate,
    analyze_entry_point: EntryPointAnalysis,
    extensive_diagnosis: bool,
    found_outside: bool,
}

/// State of one traversal.
struct Walk<'l> {
    linter: &'l Linter,
    entered: bool,
    found_outside: bool,
    diagnostics: Vec<Diagnostic>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Linter {
    pub fn new(
        rules: Vec<Rule>,
        is_entry_point: EntryPointPredicate,
        analyze_entry_point: EntryPointAnalysis,
    ) -> Self {
        Self {
            rules,
            is_entry_point,
            analyze_entry_point,
            extensive_diagnosis: false,
            found_outside: false,
        }
    }

    /// Keep descending into nodes that already violated a rule.
    pub fn with_extensive_diagnosis(mut self, extensive_diagnosis: bool) -> Self {
        self.extensive_diagnosis = extensive_diagnosis;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Lints `tree`, returning diagnostics in traversal order.
    pub fn lint(&mut self, tree: &Node) -> Vec<Diagnostic> {
        debug!("Linting tree: {}", tree.abbreviated(60));
        let mut walk = Walk {
            linter: self,
            entered: false,
            found_outside: false,
            diagnostics: Vec::new(),
        };
        walk.visit(tree);
        let Walk {
            found_outside,
            diagnostics,
            ..
        } = walk;
        self.found_outside = found_outside;
        debug!("Linting finished, got {} diagnostic(s).", diagnostics.len());
        diagnostics
    }

    /// Whether the most recent run found a leaf outside every entry point.
    pub fn found_code_outside(&self) -> bool {
        self.found_outside
    }
}

impl Walk<'_> {
    fn visit(&mut self, node: &Node) {
        if self.entered {
            self.visit_inside(node);
        } else {
            self.visit_outside(node);
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in node.children() {
            self.visit(child);
        }
    }

    fn visit_outside(&mut self, node: &Node) {
        let analysis = (self.linter.analyze_entry_point)(node);
        let rejected = analysis.iter().any(Diagnostic::is_error);
        self.diagnostics.extend(analysis);

        if !(self.linter.is_entry_point)(node) {
            let children = node.children();
            if children.is_empty() {
                self.found_outside = true;
            }
            for child in children {
                self.visit(child);
            }
        } else if !rejected {
            debug!("Found admissible node: {}", node.abbreviated(60));
            self.entered = true;
            self.visit_children(node);
            self.entered = false;
        } else {
            debug!(
                "Entry-point analysis found an error, skipping admissible node: {}",
                node.abbreviated(60)
            );
        }
    }

    fn visit_inside(&mut self, node: &Node) {
        let found: Vec<Diagnostic> = self
            .linter
            .rules
            .iter()
            .filter_map(|rule| rule.check(node))
            .collect();
        if !found.is_empty() {
            debug!(
                "Rules ({}) were applicable: {}",
                found.len(),
                found
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ")
            );
        }
        let descend = found.is_empty() || self.linter.extensive_diagnosis;
        self.diagnostics.extend(found);
        if descend {
            self.visit_children(node);
        }
    }
}

/// The linter for probabilistic programs with the complete rule battery.
pub fn default_linter() -> Linter {
    Linter::new(
        rules::default_rules(),
        entry_point::is_probabilistic_program,
        entry_point::analyze_probabilistic_program,
    )
}

/// Decides whether `tree` may be translated.
///
/// Fails with the reasons when code exists outside of every probabilistic
/// program or when any diagnostic is an error.
pub fn validate(tree: &Node) -> Result<(), Vec<String>> {
    let mut linter = default_linter();
    let diagnostics = linter.lint(tree);
    let mut reasons: Vec<String> = Vec::new();
    if linter.found_code_outside() {
        reasons.push("Found code outside of probabilistic programs.".to_string());
    }
    reasons.extend(
        diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.is_error())
            .map(|diagnostic| diagnostic.to_string().trim_start().to_string()),
    );
    if reasons.is_empty() {
        Ok(())
    } else {
        Err(reasons)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    fn import_math() -> Node {
        use crate::ast::{Alias, NodeKind};
        Node::new(NodeKind::Import {
            names: vec![Alias {
                name: "math".to_string(),
                asname: None,
            }],
        })
        .at(3, 4)
    }

    #[test]
    fn conforming_model_is_clean() {
        let tree = module(vec![model(
            "m",
            &["data"],
            vec![return_value(call("len", vec![name("data")]))],
        )]);
        let mut linter = default_linter();
        assert!(linter.lint(&tree).is_empty());
        assert!(!linter.found_code_outside());
    }

    #[test]
    fn violations_stop_descent_unless_extensive() {
        // `pass` inside a nested function would fire a second time.
        let nested = function("inner", &[], vec![pass()]);
        let tree = module(vec![model("m", &[], vec![nested])]);
        assert_eq!(default_linter().lint(&tree).len(), 1);
        let diagnostics = default_linter().with_extensive_diagnosis(true).lint(&tree);
        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Nested functions are prohibited", "Pass statements are prohibited"]
        );
    }

    #[test]
    fn code_outside_entry_points_is_noticed_but_not_linted() {
        let tree = module(vec![expression(call("print", vec![int(1)]))]);
        let mut linter = default_linter();
        assert!(linter.lint(&tree).is_empty());
        assert!(linter.found_code_outside());
        assert!(validate(&tree).is_err());
    }

    #[test]
    fn rejected_entry_points_are_skipped() {
        let mut node = model("m", &["x"], vec![pass()]);
        if let crate::ast::NodeKind::FunctionDef { args, .. } = &mut node.kind {
            args.defaults.push(int(1));
        }
        let diagnostics = default_linter().lint(&module(vec![node]));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.starts_with("The use of keyword arguments"));
    }

    #[test]
    fn validation_lists_errors() {
        let tree = module(vec![model("f", &[], vec![import_math()])]);
        let reasons = validate(&tree).unwrap_err();
        assert_eq!(reasons, vec!["3:4: ERROR: Importing is prohibited".to_string()]);
    }

    #[test]
    fn runs_do_not_leak_state() {
        let tree = module(vec![model("f", &[], vec![import_math()])]);
        let mut linter = default_linter();
        let first = linter.lint(&tree);
        let second = linter.lint(&tree);
        assert_eq!(first, second);
    }
}
