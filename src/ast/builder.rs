//! Constructors for syntax trees.
//!
//! The external parser is the usual source of trees; these helpers exist for
//! synthesized nodes during translation and for writing trees by hand in tests.
//!
//! ```rust
//! use pythia::ast::builder::*;
//! let tree = model("coin", &["data"], vec![
//!     assign(name("p"), call("sample", vec![string("p"), call("Uniform", vec![int(0), int(1)])])),
//! ]);
//! assert_eq!(tree.name(), Some("coin"));
//! ```

use crate::linter::entry_point::DECORATOR;

use super::{
    Arg, Arguments, BinaryOperator, BooleanOperator, ComparisonOperator, Constant, Keyword, Node,
    NodeKind, Span, UnaryOperator,
};

// === Leaves ===

pub fn name(id: &str) -> Node {
    Node::new(NodeKind::Name { id: id.to_string() })
}

pub fn constant(value: Constant) -> Node {
    Node::new(NodeKind::Constant { value })
}

pub fn string(text: &str) -> Node {
    constant(Constant::Str(text.to_string()))
}

pub fn int(value: i64) -> Node {
    constant(Constant::Int(value))
}

pub fn float(value: f64) -> Node {
    constant(Constant::Float(value))
}

pub fn boolean(value: bool) -> Node {
    constant(Constant::Bool(value))
}

pub fn none() -> Node {
    constant(Constant::None)
}

// === Expressions ===

/// Call of a bare name.
pub fn call(function: &str, args: Vec<Node>) -> Node {
    call_with(name(function), args, Vec::new())
}

pub fn call_with(func: Node, args: Vec<Node>, keywords: Vec<Keyword>) -> Node {
    Node::new(NodeKind::Call {
        func: Box::new(func),
        args,
        keywords,
    })
}

pub fn keyword(arg: &str, value: Node) -> Keyword {
    Keyword {
        arg: Some(arg.to_string()),
        value,
        span: Span::default(),
    }
}

pub fn attribute(value: Node, attr: &str) -> Node {
    Node::new(NodeKind::Attribute {
        value: Box::new(value),
        attr: attr.to_string(),
    })
}

pub fn subscript(value: Node, slice: Node) -> Node {
    Node::new(NodeKind::Subscript {
        value: Box::new(value),
        slice: Box::new(slice),
    })
}

pub fn slice(lower: Option<Node>, upper: Option<Node>, step: Option<Node>) -> Node {
    Node::new(NodeKind::Slice {
        lower: lower.map(Box::new),
        upper: upper.map(Box::new),
        step: step.map(Box::new),
    })
}

pub fn binary(left: Node, op: BinaryOperator, right: Node) -> Node {
    Node::new(NodeKind::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    })
}

pub fn unary(op: UnaryOperator, operand: Node) -> Node {
    Node::new(NodeKind::UnaryOp {
        op,
        operand: Box::new(operand),
    })
}

pub fn boolean_operation(op: BooleanOperator, values: Vec<Node>) -> Node {
    Node::new(NodeKind::BoolOp { op, values })
}

pub fn compare(left: Node, op: ComparisonOperator, right: Node) -> Node {
    Node::new(NodeKind::Compare {
        left: Box::new(left),
        ops: vec![op],
        comparators: vec![right],
    })
}

pub fn tuple(elts: Vec<Node>) -> Node {
    Node::new(NodeKind::Tuple { elts })
}

pub fn list(elts: Vec<Node>) -> Node {
    Node::new(NodeKind::List { elts })
}

// === Statements ===

pub fn module(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Module { body })
}

/// Undecorated function with plain positional parameters.
pub fn function(function_name: &str, parameters: &[&str], body: Vec<Node>) -> Node {
    let args = Arguments {
        args: parameters.iter().map(|parameter| arg(parameter)).collect(),
        ..Arguments::default()
    };
    Node::new(NodeKind::FunctionDef {
        name: function_name.to_string(),
        args,
        body,
        decorators: Vec::new(),
        returns: None,
        type_params: Vec::new(),
        is_async: false,
    })
}

/// Function decorated with `@probabilistic_program`.
pub fn model(function_name: &str, parameters: &[&str], body: Vec<Node>) -> Node {
    decorated(function(function_name, parameters, body), vec![name(DECORATOR)])
}

/// Replaces the decorators of a function or class definition.
pub fn decorated(mut node: Node, decorators: Vec<Node>) -> Node {
    match &mut node.kind {
        NodeKind::FunctionDef {
            decorators: existing,
            ..
        }
        | NodeKind::ClassDef {
            decorators: existing,
            ..
        } => *existing = decorators,
        _ => {}
    }
    node
}

pub fn arg(parameter: &str) -> Arg {
    Arg {
        name: parameter.to_string(),
        annotation: None,
        span: Span::default(),
    }
}

pub fn assign(target: Node, value: Node) -> Node {
    Node::new(NodeKind::Assign {
        targets: vec![target],
        value: Box::new(value),
    })
}

/// Expression statement.
pub fn expression(value: Node) -> Node {
    Node::new(NodeKind::Expr {
        value: Box::new(value),
    })
}

pub fn return_value(value: Node) -> Node {
    Node::new(NodeKind::Return {
        value: Some(Box::new(value)),
    })
}

pub fn empty_return() -> Node {
    Node::new(NodeKind::Return { value: None })
}

/// `for target in range(arguments...)`.
pub fn for_range(target: &str, arguments: Vec<Node>, body: Vec<Node>) -> Node {
    for_each(name(target), call("range", arguments), body)
}

pub fn for_each(target: Node, iter: Node, body: Vec<Node>) -> Node {
    Node::new(NodeKind::For {
        target: Box::new(target),
        iter: Box::new(iter),
        body,
        orelse: Vec::new(),
        is_async: false,
    })
}

pub fn while_loop(test: Node, body: Vec<Node>) -> Node {
    Node::new(NodeKind::While {
        test: Box::new(test),
        body,
        orelse: Vec::new(),
    })
}

pub fn if_else(test: Node, body: Vec<Node>, orelse: Vec<Node>) -> Node {
    Node::new(NodeKind::If {
        test: Box::new(test),
        body,
        orelse,
    })
}

pub fn pass() -> Node {
    Node::new(NodeKind::Pass)
}
