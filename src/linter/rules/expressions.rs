//! Rules restricting expressions.

use super::{flag, Rule};
use crate::ast::{
    BinaryOperator, ComparisonOperator, Comprehension, Node, NodeKind, UnaryOperator,
};

// === Operators ===

pub const RESTRICT_BINARY_OPERATORS: Rule = Rule::error(
    "restrict-binary-operators",
    "Binary operators may only be of: +, -, *, /, //, %, **",
    binary_operator,
);

pub const RESTRICT_COMPARISON_OPERATORS: Rule = Rule::error(
    "restrict-comparison-operators",
    "Comparison operators may only be binary and one of: ==, !=, <, <=, >, >=",
    comparison_operator,
);

pub const RESTRICT_UNARY_OPERATORS: Rule = Rule::error(
    "restrict-unary-operators",
    "Unary operators may only be of: +, -, not",
    unary_operator,
);

// === Inline statements ===

pub const NO_WALRUS: Rule = Rule::error("no-walrus", "Walrus operators are prohibited", walrus);

pub const NO_LAMBDA: Rule = Rule::error("no-lambda", "Lambda expressions are prohibited", lambda);

pub const NO_INLINE_IF: Rule = Rule::error(
    "no-inline-if",
    "Inline if expressions are prohibited",
    inline_if,
);

// === Data structures ===

pub const NO_DICTIONARY: Rule =
    Rule::error("no-dictionary", "Dictionaries are prohibited", dictionary);

pub const NO_SET: Rule = Rule::error("no-set", "Sets are prohibited", set);

pub const NO_COMPREHENSION: Rule = Rule::error(
    "no-comprehension",
    "Comprehensions are prohibited",
    comprehension,
);

// === Coroutines and generators ===

pub const NO_ASYNCHRONOUS_EXPRESSION: Rule = Rule::error(
    "no-asynchronous-expression",
    "Asynchronous expressions are prohibited",
    asynchronous_expression,
);

pub const NO_YIELD: Rule = Rule::error("no-yield", "Yields are prohibited", yield_expression);

// === Miscellaneous ===

pub const NO_FSTRING: Rule = Rule::error("no-fstring", "F-Strings are prohibited", fstring);

pub const NO_STARRED: Rule = Rule::error("no-starred", "Starred variables are prohibited", starred);

pub const NO_TYPE_PARAMETER: Rule = Rule::error(
    "no-type-parameter",
    "Type parameters are prohibited",
    type_parameter,
);

pub const NO_SLICE: Rule = Rule::error("no-slice", "Slices are prohibited", slice);

pub const NO_MULTI_SUBSCRIPT: Rule = Rule::error(
    "no-multi-subscript",
    "Multi-subscripts are prohibited",
    multi_subscript,
);

pub const RULES: &[Rule] = &[
    RESTRICT_BINARY_OPERATORS,
    RESTRICT_COMPARISON_OPERATORS,
    RESTRICT_UNARY_OPERATORS,
    NO_WALRUS,
    NO_LAMBDA,
    NO_INLINE_IF,
    NO_DICTIONARY,
    NO_SET,
    NO_COMPREHENSION,
    NO_ASYNCHRONOUS_EXPRESSION,
    NO_YIELD,
    NO_FSTRING,
    NO_STARRED,
    NO_TYPE_PARAMETER,
    NO_SLICE,
    NO_MULTI_SUBSCRIPT,
];

// ============================================================================
// MATCHERS
// ============================================================================

fn binary_operator(node: &Node) -> Option<&Node> {
    use BinaryOperator::*;
    match node.kind {
        NodeKind::BinOp { op, .. } => flag(
            node,
            !matches!(op, Add | Sub | Mult | Div | FloorDiv | Mod | Pow),
        ),
        _ => None,
    }
}

fn comparison_operator(node: &Node) -> Option<&Node> {
    use ComparisonOperator::*;
    let NodeKind::Compare {
        ops, comparators, ..
    } = &node.kind
    else {
        return None;
    };
    let binary = comparators.len() == 1
        && matches!(ops.as_slice(), [Eq | NotEq | Lt | LtE | Gt | GtE]);
    flag(node, !binary)
}

fn unary_operator(node: &Node) -> Option<&Node> {
    match node.kind {
        NodeKind::UnaryOp { op, .. } => flag(node, op == UnaryOperator::Invert),
        _ => None,
    }
}

fn walrus(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::NamedExpr { .. }))
}

fn lambda(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Lambda { .. }))
}

fn inline_if(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::IfExp { .. }))
}

/// Literal displays and calls to the bare builtin constructor.
fn literal_or_constructed(node: &Node, literal: bool, constructor: &str) -> bool {
    literal
        || node
            .as_call()
            .is_some_and(|call| matches!(&call.func.kind, NodeKind::Name { id } if id == constructor))
}

fn dictionary(node: &Node) -> Option<&Node> {
    let literal = matches!(node.kind, NodeKind::Dict { .. });
    flag(node, literal_or_constructed(node, literal, "dict"))
}

fn set(node: &Node) -> Option<&Node> {
    let literal = matches!(node.kind, NodeKind::Set { .. });
    flag(node, literal_or_constructed(node, literal, "set"))
}

fn generators(node: &Node) -> Option<&[Comprehension]> {
    match &node.kind {
        NodeKind::ListComp { generators, .. }
        | NodeKind::SetComp { generators, .. }
        | NodeKind::DictComp { generators, .. }
        | NodeKind::GeneratorExp { generators, .. } => Some(generators),
        _ => None,
    }
}

fn comprehension(node: &Node) -> Option<&Node> {
    flag(node, generators(node).is_some())
}

fn asynchronous_expression(node: &Node) -> Option<&Node> {
    let awaited = matches!(node.kind, NodeKind::Await { .. });
    let asynchronous_generator = generators(node)
        .is_some_and(|generators| generators.iter().any(|generator| generator.is_async));
    flag(node, awaited || asynchronous_generator)
}

fn yield_expression(node: &Node) -> Option<&Node> {
    flag(
        node,
        matches!(node.kind, NodeKind::Yield { .. } | NodeKind::YieldFrom { .. }),
    )
}

fn fstring(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::JoinedStr { .. }))
}

fn starred(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Starred { .. }))
}

fn type_parameter(node: &Node) -> Option<&Node> {
    flag(
        node,
        matches!(
            node.kind,
            NodeKind::TypeVar { .. } | NodeKind::ParamSpec { .. } | NodeKind::TypeVarTuple { .. }
        ),
    )
}

fn slice(node: &Node) -> Option<&Node> {
    flag(node, matches!(node.kind, NodeKind::Slice { .. }))
}

fn multi_subscript(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::Subscript { slice, .. } => flag(node, slice.is_sequence()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    #[test]
    fn chained_comparisons_are_not_binary() {
        let single = compare(name("a"), ComparisonOperator::Lt, name("b"));
        assert!(RESTRICT_COMPARISON_OPERATORS.check(&single).is_none());
        let chained = Node::new(NodeKind::Compare {
            left: Box::new(name("a")),
            ops: vec![ComparisonOperator::Lt, ComparisonOperator::Lt],
            comparators: vec![name("b"), name("c")],
        });
        assert!(RESTRICT_COMPARISON_OPERATORS.check(&chained).is_some());
        let membership = compare(name("a"), ComparisonOperator::In, name("b"));
        assert!(RESTRICT_COMPARISON_OPERATORS.check(&membership).is_some());
    }

    #[test]
    fn bitwise_operators_are_rejected() {
        let shift = binary(name("a"), BinaryOperator::LShift, int(1));
        let power = binary(name("a"), BinaryOperator::Pow, int(2));
        assert!(RESTRICT_BINARY_OPERATORS.check(&shift).is_some());
        assert!(RESTRICT_BINARY_OPERATORS.check(&power).is_none());
        let invert = unary(UnaryOperator::Invert, name("a"));
        assert!(RESTRICT_UNARY_OPERATORS.check(&invert).is_some());
        let negate = unary(UnaryOperator::USub, name("a"));
        assert!(RESTRICT_UNARY_OPERATORS.check(&negate).is_none());
    }

    #[test]
    fn builtin_constructors_count_as_literals() {
        assert!(NO_DICTIONARY.check(&call("dict", vec![])).is_some());
        assert!(NO_SET.check(&call("set", vec![])).is_some());
        let qualified = call_with(attribute(name("builtins"), "dict"), vec![], vec![]);
        assert!(NO_DICTIONARY.check(&qualified).is_none());
    }

    #[test]
    fn tuple_subscripts_are_multi_subscripts() {
        let multi = subscript(name("m"), tuple(vec![name("i"), name("j")]));
        assert!(NO_MULTI_SUBSCRIPT.check(&multi).is_some());
        let single = subscript(name("m"), name("i"));
        assert!(NO_MULTI_SUBSCRIPT.check(&single).is_none());
    }
}
