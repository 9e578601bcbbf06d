//! The dialect's rule battery.
//!
//! Every rule is a pure, context-free check of a single node. A rule that
//! fires reports its fixed message at its fixed severity, anchored either at
//! the node itself or at the child that is actually at fault.

use std::fmt;

use crate::ast::Node;
use crate::diagnostics::{Diagnostic, Severity};

pub mod expressions;
pub mod patterns;
pub mod primitives;
pub mod statements;

/// Finds the node a rule violation should be anchored at, if any.
pub type Matcher = for<'n> fn(&'n Node) -> Option<&'n Node>;

/// A named, stateless check with a fixed message.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub message: &'static str,
    pub severity: Severity,
    matcher: Matcher,
}

impl Rule {
    pub const fn new(
        name: &'static str,
        message: &'static str,
        severity: Severity,
        matcher: Matcher,
    ) -> Self {
        Self {
            name,
            message,
            severity,
            matcher,
        }
    }

    pub const fn error(name: &'static str, message: &'static str, matcher: Matcher) -> Self {
        Self::new(name, message, Severity::Error, matcher)
    }

    pub const fn warning(name: &'static str, message: &'static str, matcher: Matcher) -> Self {
        Self::new(name, message, Severity::Warning, matcher)
    }

    pub fn check(&self, node: &Node) -> Option<Diagnostic> {
        (self.matcher)(node)
            .map(|anchor| Diagnostic::from_node(anchor, self.message, self.severity))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// Flags `node` itself when `condition` holds.
pub(crate) fn flag(node: &Node, condition: bool) -> Option<&Node> {
    condition.then_some(node)
}

/// The complete battery applied inside probabilistic programs.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend_from_slice(statements::RULES);
    rules.extend_from_slice(expressions::RULES);
    rules.extend_from_slice(primitives::RULES);
    rules
}
