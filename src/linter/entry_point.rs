//! Recognition and analysis of `@probabilistic_program` entry points.
//!
//! Decorators are matched by their trailing identifier only. Where the
//! decorator was imported from is never resolved, so an unrelated decorator of
//! the same name marks a function as an entry point all the same.

use tracing::{debug, warn};

use crate::ast::{Node, NodeKind};
use crate::diagnostics::{Diagnostic, Severity};

/// Name of the decorator marking a probabilistic program.
pub const DECORATOR: &str = "probabilistic_program";

/// Whether a synchronous function carries the entry-point decorator.
pub fn is_probabilistic_program(node: &Node) -> bool {
    match &node.kind {
        NodeKind::FunctionDef {
            decorators,
            is_async: false,
            ..
        } => has_marker(decorators),
        _ => false,
    }
}

/// Diagnoses the entry point itself, which the rule battery never sees.
///
/// Misplaced markers are reported for information only. Decorators that are
/// neither names, attributes nor calls cannot be verified and are reported as
/// warnings. Only a marked function's parameters may produce an error, which
/// then keeps the linter out of the function body.
pub fn analyze_probabilistic_program(node: &Node) -> Vec<Diagnostic> {
    let decorators = match &node.kind {
        NodeKind::FunctionDef {
            decorators,
            is_async: false,
            ..
        } => decorators,
        NodeKind::FunctionDef { decorators, .. } | NodeKind::ClassDef { decorators, .. } => {
            if has_marker(decorators) {
                return vec![Diagnostic::from_node(
                    node,
                    "Probabilistic program decorators are intended for functions only",
                    Severity::Information,
                )];
            }
            return Vec::new();
        }
        _ => return Vec::new(),
    };

    let mut diagnostics: Vec<Diagnostic> = decorators
        .iter()
        .filter(|decorator| !is_verifiable(decorator))
        .map(|decorator| {
            debug!("Could not verify decorator: {}", decorator.abbreviated(60));
            Diagnostic::from_node(decorator, "Could not verify decorator.", Severity::Warning)
        })
        .collect();
    if !diagnostics.is_empty() {
        warn!(
            "Could not verify at least one decorator of `{}`.",
            node.name().unwrap_or_default()
        );
    }

    if !has_marker(decorators) {
        return diagnostics;
    }
    let NodeKind::FunctionDef { args, .. } = &node.kind else {
        return diagnostics;
    };
    if !args.kwonlyargs.is_empty()
        || args.vararg.is_some()
        || args.kwarg.is_some()
        || !args.kw_defaults.is_empty()
        || !args.defaults.is_empty()
    {
        diagnostics.push(Diagnostic::error(
            node,
            "The use of keyword arguments, `*args`, `**kwargs`, and defaults is discouraged",
        ));
    }
    let typed = args
        .posonlyargs
        .iter()
        .chain(&args.args)
        .chain(args.vararg.as_ref())
        .chain(args.kwarg.as_ref())
        .any(|arg| arg.annotation.is_some());
    if typed {
        diagnostics.push(Diagnostic::from_node(
            node,
            "Typing is discouraged",
            Severity::Warning,
        ));
    }
    diagnostics
}

fn has_marker(decorators: &[Node]) -> bool {
    decorators.iter().any(|decorator| match &decorator.kind {
        NodeKind::Name { id } => id == DECORATOR,
        NodeKind::Attribute { attr, .. } => attr == DECORATOR,
        _ => false,
    })
}

fn is_verifiable(decorator: &Node) -> bool {
    matches!(
        decorator.kind,
        NodeKind::Name { .. } | NodeKind::Attribute { .. } | NodeKind::Call { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::BinaryOperator;

    #[test]
    fn marker_may_be_qualified() {
        let qualified = decorated(
            function("m", &[], vec![]),
            vec![attribute(name("pythia"), DECORATOR)],
        );
        assert!(is_probabilistic_program(&qualified));
        assert!(!is_probabilistic_program(&function("m", &[], vec![])));
        let called = decorated(function("m", &[], vec![]), vec![call(DECORATOR, vec![])]);
        assert!(!is_probabilistic_program(&called));
    }

    #[test]
    fn unverifiable_decorators_are_warned_about() {
        let strange = binary(name("a"), BinaryOperator::Add, name("b"));
        let node = decorated(function("m", &[], vec![]), vec![strange]);
        let diagnostics = analyze_probabilistic_program(&node);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].message, "Could not verify decorator.");
        assert!(!is_probabilistic_program(&node));
    }

    #[test]
    fn defaults_are_errors_and_annotations_warnings() {
        let mut node = model("m", &["x"], vec![]);
        if let NodeKind::FunctionDef { args, .. } = &mut node.kind {
            args.defaults.push(int(1));
            args.args[0].annotation = Some(Box::new(name("int")));
        }
        let severities: Vec<_> = analyze_probabilistic_program(&node)
            .into_iter()
            .map(|diagnostic| diagnostic.severity)
            .collect();
        assert_eq!(severities, vec![Severity::Error, Severity::Warning]);
    }

    #[test]
    fn marked_classes_are_informed() {
        let class = decorated(
            Node::new(NodeKind::ClassDef {
                name: "C".to_string(),
                bases: vec![],
                keywords: vec![],
                body: vec![pass()],
                decorators: vec![],
                type_params: vec![],
            }),
            vec![name(DECORATOR)],
        );
        let diagnostics = analyze_probabilistic_program(&class);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Information);
    }
}
