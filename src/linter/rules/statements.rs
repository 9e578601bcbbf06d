//! Rules restricting statements.

use super::patterns::is_function_called;
use super::{flag, Rule};
use crate::ast::{Node, NodeKind};

// === Definitions and declarations ===

pub const NO_NESTED_FUNCTIONS: Rule = Rule::error(
    "no-nested-functions",
    "Nested functions are prohibited",
    nested_function,
);

pub const NO_NESTED_CLASSES: Rule = Rule::error(
    "no-nested-classes",
    "Nested classes are prohibited",
    nested_class,
);

pub const NO_IMPORT: Rule = Rule::error("no-import", "Importing is prohibited", import);

pub const NO_GLOBAL: Rule = Rule::error(
    "no-global",
    "Declaring global variables is prohibited",
    global,
);

pub const NO_DELETE: Rule = Rule::error(
    "no-delete",
    "Delete statements are prohibited",
    delete,
);

pub const NO_TYPE_ALIAS: Rule = Rule::error(
    "no-type-alias",
    "Type aliasing is prohibited",
    type_alias,
);

// === Assignments ===

pub const NO_DECONSTRUCTOR: Rule = Rule::error(
    "no-deconstructor",
    "Deconstructors are prohibited",
    deconstructor,
);

pub const NO_CHAINED_ASSIGNMENT: Rule = Rule::error(
    "no-chained-assignment",
    "Chained assignments are prohibited",
    chained_assignment,
);

pub const NO_AUGMENTED_ASSIGN: Rule = Rule::error(
    "no-augmented-assign",
    "Augmented assigns are prohibited",
    augmented_assign,
);

pub const DISCOURAGE_ANNOTATED_ASSIGN: Rule = Rule::warning(
    "discourage-annotated-assign",
    "Annotated assigns are discouraged",
    annotated_assign,
);

pub const NO_ATTRIBUTE_ASSIGN: Rule = Rule::error(
    "no-attribute-assign",
    "Attributes may not be written to",
    attribute_assign,
);

pub const NO_STANDALONE_EXPRESSION: Rule = Rule::error(
    "no-standalone-expression",
    "Expressions may not appear as statements",
    standalone_expression,
);

// === Control flow ===

pub const RESTRICT_FOR_LOOP_ITERATOR: Rule = Rule::error(
    "restrict-for-loop-iterator",
    "For-loops may only use `range`",
    for_loop_iterator,
);

pub const NO_FOR_ELSE: Rule = Rule::error(
    "no-for-else",
    "For-loops may not have `else` blocks",
    for_else,
);

pub const NO_WHILE_ELSE: Rule = Rule::error(
    "no-while-else",
    "While-loops may not have `else` blocks",
    while_else,
);

pub const NO_WITH: Rule = Rule::error("no-with", "With statements are prohibited", with);

pub const NO_MATCH: Rule = Rule::error(
    "no-match",
    "The match control-flow construct is prohibited",
    match_statement,
);

pub const NO_ASYNCHRONOUS_STATEMENT: Rule = Rule::error(
    "no-asynchronous-statement",
    "Asynchronous statements are prohibited",
    asynchronous_statement,
);

pub const NO_PASS: Rule = Rule::error("no-pass", "Pass statements are prohibited", pass);

pub const NO_EMPTY_RETURN: Rule = Rule::error(
    "no-empty-return",
    "Empty returns are prohibited",
    empty_return,
);

pub const NO_RAISE: Rule = Rule::error(
    "no-raise",
    "Raising exceptions is prohibited",
    raise,
);

pub const NO_TRY: Rule = Rule::error(
    "no-try",
    "The try-except control-flow is prohibited",
    try_statement,
);

pub const NO_ASSERT: Rule = Rule::error("no-assert", "Assertions are prohibited", assert);

pub const RULES: &[Rule] = &[
    NO_NESTED_FUNCTIONS,
    NO_NESTED_CLASSES,
    NO_IMPORT,
    NO_GLOBAL,
    NO_DELETE,
    NO_TYPE_ALIAS,
    NO_DECONSTRUCTOR,
    NO_CHAINED_ASSIGNMENT,
    NO_AUGMENTED_ASSIGN,
    DISCOURAGE_ANNOTATED_ASSIGN,
    NO_ATTRIBUTE_ASSIGN,
    NO_STANDALONE_EXPRESSION,
    RESTRICT_FOR_LOOP_ITERATOR,
    NO_FOR_ELSE,
    NO_WHILE_ELSE,
    NO_WITH,
    NO_MATCH,
    NO_ASYNCHRONOUS_STATEMENT,
    NO_PASS,
    NO_EMPTY_RETURN,
    NO_RAISE,
    NO_TRY,
    NO_ASSERT,
];

// ============================================================================
// MATCHERS
// ============================================================================

fn nested_function(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::FunctionDef { .. }))
}

fn nested_class(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::ClassDef { .. }))
}

fn import(node: &Node) -> Option<&Node> {
    flag(
        node,
        matches!(node.kind, NodeKind::Import { .. } | NodeKind::ImportFrom { .. }),
    )
}

fn global(node: &Node) -> Option<&Node> {
    flag(
        node,
        matches!(node.kind, NodeKind::Global { .. } | NodeKind::Nonlocal { .. }),
    )
}

fn delete(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Delete { .. }))
}

fn type_alias(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::TypeAlias { .. }))
}

fn deconstructor(node: &Node) -> Option<&Node> {
    // Only plain assignments can destructure.
    let NodeKind::Assign { targets, .. } = &node.kind else {
        return None;
    };
    flag(node, targets.iter().any(Node::is_sequence))
}

fn chained_assignment(node: &Node) -> Option<&Node> {
    let NodeKind::Assign { targets, .. } = &node.kind else {
        return None;
    };
    flag(node, targets.len() > 1)
}

fn augmented_assign(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::AugAssign { .. }))
}

fn annotated_assign(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::AnnAssign { .. }))
}

fn attribute_assign(node: &Node) -> Option<&Node> {
    let is_attribute = |target: &Node| matches!(target.kind, NodeKind::Attribute { .. });
    let written = match &node.kind {
        NodeKind::Assign { targets, .. } => targets.iter().any(is_attribute),
        NodeKind::AnnAssign { target, .. } | NodeKind::AugAssign { target, .. } => {
            is_attribute(target.as_ref())
        }
        _ => false,
    };
    flag(node, written)
}

fn standalone_expression(node: &Node) -> Option<&Node> {
    let NodeKind::Expr { value } = &node.kind else {
        return None;
    };
    let permitted = ["observe", "factor"]
        .iter()
        .any(|primitive| is_function_called(value, primitive));
    flag(node, !permitted)
}

fn for_loop_iterator(node: &Node) -> Option<&Node> {
    let NodeKind::For { iter, .. } = &node.kind else {
        return None;
    };
    match iter.as_call() {
        Some(call) if matches!(&call.func.kind, NodeKind::Name { id } if id == "range") => None,
        _ => Some(iter),
    }
}

fn for_else(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::For { orelse, .. } => flag(node, !orelse.is_empty()),
        _ => None,
    }
}

fn while_else(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::While { orelse, .. } => flag(node, !orelse.is_empty()),
        _ => None,
    }
}

fn with(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::With { .. }))
}

fn match_statement(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Match { .. }))
}

fn asynchronous_statement(node: &Node) -> Option<&Node> {
    let asynchronous = match node.kind {
        NodeKind::FunctionDef { is_async, .. }
        | NodeKind::For { is_async, .. }
        | NodeKind::With { is_async, .. } => is_async,
        _ => false,
    };
    flag(node, asynchronous)
}

fn pass(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Pass))
}

fn empty_return(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Return { value: None }))
}

fn raise(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Raise { .. }))
}

fn try_statement(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Try { .. }))
}

fn assert(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Assert { .. }))
}
