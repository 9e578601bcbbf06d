//! Syntax tree for the PyThia dialect.
//!
//! Trees are produced by an external parser and handed to this crate as JSON.
//! The node vocabulary mirrors the host language's abstract syntax closely
//! enough that every construct the linter has to reject stays representable,
//! while the translator only ever maps the small admissible subset.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod builder;
mod unparse;

pub use unparse::{julia_string, python_string};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Source location of a node.
///
/// Lines are 1-based and columns 0-based. End positions are optional; when
/// absent, or when they precede the start, they collapse onto the start.
///
/// # Examples
///
/// ```rust
/// use pythia::ast::Span;
/// let span = Span::new(3, 4).with_end(2, 0);
/// assert_eq!(span.end_line(), 3);
/// assert_eq!(span.end_column(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

/// A syntax tree node: its kind (with children) plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub span: Span,
}

/// Every syntactic construct the external parser may hand over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum NodeKind {
    // Statements.
    Module {
        #[serde(default)]
        body: Vec<Node>,
    },
    FunctionDef {
        name: String,
        #[serde(default)]
        args: Arguments,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        decorators: Vec<Node>,
        #[serde(default)]
        returns: Option<Box<Node>>,
        #[serde(default)]
        type_params: Vec<Node>,
        #[serde(default)]
        is_async: bool,
    },
    ClassDef {
        name: String,
        #[serde(default)]
        bases: Vec<Node>,
        #[serde(default)]
        keywords: Vec<Keyword>,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        decorators: Vec<Node>,
        #[serde(default)]
        type_params: Vec<Node>,
    },
    Return {
        #[serde(default)]
        value: Option<Box<Node>>,
    },
    Delete {
        targets: Vec<Node>,
    },
    Assign {
        targets: Vec<Node>,
        value: Box<Node>,
    },
    TypeAlias {
        name: Box<Node>,
        #[serde(default)]
        type_params: Vec<Node>,
        value: Box<Node>,
    },
    AugAssign {
        target: Box<Node>,
        op: BinaryOperator,
        value: Box<Node>,
    },
    AnnAssign {
        target: Box<Node>,
        annotation: Box<Node>,
        #[serde(default)]
        value: Option<Box<Node>>,
    },
    For {
        target: Box<Node>,
        iter: Box<Node>,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        orelse: Vec<Node>,
        #[serde(default)]
        is_async: bool,
    },
    While {
        test: Box<Node>,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        orelse: Vec<Node>,
    },
    If {
        test: Box<Node>,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        orelse: Vec<Node>,
    },
    With {
        items: Vec<WithItem>,
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        is_async: bool,
    },
    Match {
        subject: Box<Node>,
        #[serde(default)]
        cases: Vec<MatchCase>,
    },
    Raise {
        #[serde(default)]
        exc: Option<Box<Node>>,
        #[serde(default)]
        cause: Option<Box<Node>>,
    },
    Try {
        #[serde(default)]
        body: Vec<Node>,
        #[serde(default)]
        handlers: Vec<Node>,
        #[serde(default)]
        orelse: Vec<Node>,
        #[serde(default)]
        finalbody: Vec<Node>,
        #[serde(default)]
        is_star: bool,
    },
    ExceptHandler {
        #[serde(default)]
        exception: Option<Box<Node>>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        body: Vec<Node>,
    },
    Assert {
        test: Box<Node>,
        #[serde(default)]
        msg: Option<Box<Node>>,
    },
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        #[serde(default)]
        module: Option<String>,
        names: Vec<Alias>,
        #[serde(default)]
        level: u32,
    },
    Global {
        names: Vec<String>,
    },
    Nonlocal {
        names: Vec<String>,
    },
    Expr {
        value: Box<Node>,
    },
    Pass,
    Break,
    Continue,

    // Expressions.
    BoolOp {
        op: BooleanOperator,
        values: Vec<Node>,
    },
    NamedExpr {
        target: Box<Node>,
        value: Box<Node>,
    },
    BinOp {
        left: Box<Node>,
        op: BinaryOperator,
        right: Box<Node>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Node>,
    },
    Lambda {
        #[serde(default)]
        args: Arguments,
        body: Box<Node>,
    },
    IfExp {
        test: Box<Node>,
        body: Box<Node>,
        orelse: Box<Node>,
    },
    Dict {
        #[serde(default)]
        keys: Vec<Option<Node>>,
        #[serde(default)]
        values: Vec<Node>,
    },
    Set {
        #[serde(default)]
        elts: Vec<Node>,
    },
    ListComp {
        elt: Box<Node>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Node>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Node>,
        value: Box<Node>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Node>,
        generators: Vec<Comprehension>,
    },
    Await {
        value: Box<Node>,
    },
    Yield {
        #[serde(default)]
        value: Option<Box<Node>>,
    },
    YieldFrom {
        value: Box<Node>,
    },
    Compare {
        left: Box<Node>,
        ops: Vec<ComparisonOperator>,
        comparators: Vec<Node>,
    },
    Call {
        func: Box<Node>,
        #[serde(default)]
        args: Vec<Node>,
        #[serde(default)]
        keywords: Vec<Keyword>,
    },
    FormattedValue {
        value: Box<Node>,
        #[serde(default)]
        conversion: Option<char>,
        #[serde(default)]
        format_spec: Option<Box<Node>>,
    },
    JoinedStr {
        #[serde(default)]
        values: Vec<Node>,
    },
    Constant {
        value: Constant,
    },
    Attribute {
        value: Box<Node>,
        attr: String,
    },
    Subscript {
        value: Box<Node>,
        slice: Box<Node>,
    },
    Starred {
        value: Box<Node>,
    },
    Name {
        id: String,
    },
    List {
        #[serde(default)]
        elts: Vec<Node>,
    },
    Tuple {
        #[serde(default)]
        elts: Vec<Node>,
    },
    Slice {
        #[serde(default)]
        lower: Option<Box<Node>>,
        #[serde(default)]
        upper: Option<Box<Node>>,
        #[serde(default)]
        step: Option<Box<Node>>,
    },

    // Type parameters.
    TypeVar {
        name: String,
        #[serde(default)]
        bound: Option<Box<Node>>,
    },
    ParamSpec {
        name: String,
    },
    TypeVarTuple {
        name: String,
    },
}

/// Fieldless mirror of [`NodeKind`], used to key mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Module,
    FunctionDef,
    ClassDef,
    Return,
    Delete,
    Assign,
    TypeAlias,
    AugAssign,
    AnnAssign,
    For,
    While,
    If,
    With,
    Match,
    Raise,
    Try,
    ExceptHandler,
    Assert,
    Import,
    ImportFrom,
    Global,
    Nonlocal,
    Expr,
    Pass,
    Break,
    Continue,
    BoolOp,
    NamedExpr,
    BinOp,
    UnaryOp,
    Lambda,
    IfExp,
    Dict,
    Set,
    ListComp,
    SetComp,
    DictComp,
    GeneratorExp,
    Await,
    Yield,
    YieldFrom,
    Compare,
    Call,
    FormattedValue,
    JoinedStr,
    Constant,
    Attribute,
    Subscript,
    Starred,
    Name,
    List,
    Tuple,
    Slice,
    TypeVar,
    ParamSpec,
    TypeVarTuple,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constant {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

/// A keyword argument; `arg` is absent for `**mapping` unpacking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    #[serde(default)]
    pub arg: Option<String>,
    pub value: Node,
    #[serde(default)]
    pub span: Span,
}

/// A single formal parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub name: String,
    #[serde(default)]
    pub annotation: Option<Box<Node>>,
    #[serde(default)]
    pub span: Span,
}

/// Formal parameters of a function or lambda.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Arguments {
    pub posonlyargs: Vec<Arg>,
    pub args: Vec<Arg>,
    pub vararg: Option<Arg>,
    pub kwonlyargs: Vec<Arg>,
    pub kw_defaults: Vec<Option<Node>>,
    pub kwarg: Option<Arg>,
    pub defaults: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    #[serde(default)]
    pub asname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comprehension {
    pub target: Node,
    pub iter: Node,
    #[serde(default)]
    pub ifs: Vec<Node>,
    #[serde(default)]
    pub is_async: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithItem {
    pub context_expr: Node,
    #[serde(default)]
    pub optional_vars: Option<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCase {
    pub pattern: Node,
    #[serde(default)]
    pub guard: Option<Node>,
    #[serde(default)]
    pub body: Vec<Node>,
}

/// Borrowed view of a call node's parts.
#[derive(Debug, Clone, Copy)]
pub struct CallParts<'n> {
    pub func: &'n Node,
    pub args: &'n [Node],
    pub keywords: &'n [Keyword],
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    /// End line, never before the start line.
    pub fn end_line(&self) -> usize {
        self.end_line
            .filter(|end| *end >= self.line)
            .unwrap_or(self.line)
    }

    /// End column, never before the start column.
    pub fn end_column(&self) -> usize {
        self.end_column
            .filter(|end| *end >= self.column)
            .unwrap_or(self.column)
    }
}

impl Node {
    /// Wraps a kind into a node without location, as used for synthesized nodes.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    /// Places the node at a start position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.span = Span::new(line, column);
        self
    }

    /// Places the node at a full start/end range.
    pub fn spanning(mut self, line: usize, column: usize, end_line: usize, end_column: usize) -> Self {
        self.span = Span::new(line, column).with_end(end_line, end_column);
        self
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    /// Whether the node can only appear in statement position.
    pub fn is_statement(&self) -> bool {
        use NodeTag::*;
        matches!(
            self.tag(),
            Module
                | FunctionDef
                | ClassDef
                | Return
                | Delete
                | Assign
                | TypeAlias
                | AugAssign
                | AnnAssign
                | For
                | While
                | If
                | With
                | Match
                | Raise
                | Try
                | ExceptHandler
                | Assert
                | Import
                | ImportFrom
                | Global
                | Nonlocal
                | Expr
                | Pass
                | Break
                | Continue
        )
    }

    /// Whether the node is a list or tuple display.
    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::List { .. } | NodeKind::Tuple { .. })
    }

    pub fn as_call(&self) -> Option<CallParts<'_>> {
        match &self.kind {
            NodeKind::Call {
                func,
                args,
                keywords,
            } => Some(CallParts {
                func,
                args,
                keywords,
            }),
            _ => None,
        }
    }

    /// The identifier a node is known by.
    ///
    /// Calls are named after their callee and attributes after their trailing
    /// attribute, so `pythia.sample(..)` is named `sample`.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Name { id } => Some(id.as_str()),
            NodeKind::Attribute { attr, .. } => Some(attr.as_str()),
            NodeKind::Call { func, .. } => func.name(),
            NodeKind::FunctionDef { name, .. }
            | NodeKind::ClassDef { name, .. }
            | NodeKind::TypeVar { name, .. }
            | NodeKind::ParamSpec { name }
            | NodeKind::TypeVarTuple { name } => Some(name.as_str()),
            NodeKind::Starred { value } => value.name(),
            _ => None,
        }
    }

    /// A one-line, length-limited rendering for log messages.
    pub fn abbreviated(&self, limit: usize) -> String {
        let text = self.unparse();
        let first = text.lines().next().unwrap_or_default();
        if first.chars().count() <= limit && !text.contains('\n') {
            return first.to_string();
        }
        let mut shortened: String = first.chars().take(limit.saturating_sub(3)).collect();
        shortened.push_str("...");
        shortened
    }

    /// Direct children in the host language's field order.
    pub fn children(&self) -> Vec<&Node> {
        let mut children: Vec<&Node> = Vec::new();
        match &self.kind {
            NodeKind::Module { body } => children.extend(body),
            NodeKind::FunctionDef {
                args,
                body,
                decorators,
                returns,
                type_params,
                ..
            } => {
                args.collect_children(&mut children);
                children.extend(body);
                children.extend(decorators);
                children.extend(returns.as_deref());
                children.extend(type_params);
            }
            NodeKind::ClassDef {
                bases,
                keywords,
                body,
                decorators,
                type_params,
                ..
            } => {
                children.extend(bases);
                children.extend(keywords.iter().map(|keyword| &keyword.value));
                children.extend(body);
                children.extend(decorators);
                children.extend(type_params);
            }
            NodeKind::Return { value } | NodeKind::Yield { value } => {
                children.extend(value.as_deref())
            }
            NodeKind::Delete { targets } => children.extend(targets),
            NodeKind::Assign { targets, value } => {
                children.extend(targets);
                children.push(value);
            }
            NodeKind::TypeAlias {
                name,
                type_params,
                value,
            } => {
                children.push(name);
                children.extend(type_params);
                children.push(value);
            }
            NodeKind::AugAssign { target, value, .. } => {
                children.push(target);
                children.push(value);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                children.push(target);
                children.push(annotation);
                children.extend(value.as_deref());
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                children.push(target);
                children.push(iter);
                children.extend(body);
                children.extend(orelse);
            }
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => {
                children.push(test);
                children.extend(body);
                children.extend(orelse);
            }
            NodeKind::With { items, body, .. } => {
                for item in items {
                    children.push(&item.context_expr);
                    children.extend(item.optional_vars.as_ref());
                }
                children.extend(body);
            }
            NodeKind::Match { subject, cases } => {
                children.push(subject);
                for case in cases {
                    children.push(&case.pattern);
                    children.extend(case.guard.as_ref());
                    children.extend(&case.body);
                }
            }
            NodeKind::Raise { exc, cause } => {
                children.extend(exc.as_deref());
                children.extend(cause.as_deref());
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            } => {
                children.extend(body);
                children.extend(handlers);
                children.extend(orelse);
                children.extend(finalbody);
            }
            NodeKind::ExceptHandler {
                exception, body, ..
            } => {
                children.extend(exception.as_deref());
                children.extend(body);
            }
            NodeKind::Assert { test, msg } => {
                children.push(test);
                children.extend(msg.as_deref());
            }
            NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Global { .. }
            | NodeKind::Nonlocal { .. }
            | NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Constant { .. }
            | NodeKind::Name { .. }
            | NodeKind::ParamSpec { .. }
            | NodeKind::TypeVarTuple { .. } => {}
            NodeKind::Expr { value }
            | NodeKind::Await { value }
            | NodeKind::YieldFrom { value }
            | NodeKind::Starred { value }
            | NodeKind::Attribute { value, .. } => children.push(value),
            NodeKind::BoolOp { values, .. } | NodeKind::JoinedStr { values } => {
                children.extend(values)
            }
            NodeKind::NamedExpr { target, value } => {
                children.push(target);
                children.push(value);
            }
            NodeKind::BinOp { left, right, .. } => {
                children.push(left);
                children.push(right);
            }
            NodeKind::UnaryOp { operand, .. } => children.push(operand),
            NodeKind::Lambda { args, body } => {
                args.collect_children(&mut children);
                children.push(body);
            }
            NodeKind::IfExp { test, body, orelse } => {
                children.push(test);
                children.push(body);
                children.push(orelse);
            }
            NodeKind::Dict { keys, values } => {
                children.extend(keys.iter().flatten());
                children.extend(values);
            }
            NodeKind::Set { elts } | NodeKind::List { elts } | NodeKind::Tuple { elts } => {
                children.extend(elts)
            }
            NodeKind::ListComp { elt, generators }
            | NodeKind::SetComp { elt, generators }
            | NodeKind::GeneratorExp { elt, generators } => {
                children.push(elt);
                collect_generators(generators, &mut children);
            }
            NodeKind::DictComp {
                key,
                value,
                generators,
            } => {
                children.push(key);
                children.push(value);
                collect_generators(generators, &mut children);
            }
            NodeKind::Compare {
                left, comparators, ..
            } => {
                children.push(left);
                children.extend(comparators);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                children.push(func);
                children.extend(args);
                children.extend(keywords.iter().map(|keyword| &keyword.value));
            }
            NodeKind::FormattedValue {
                value, format_spec, ..
            } => {
                children.push(value);
                children.extend(format_spec.as_deref());
            }
            NodeKind::Subscript { value, slice } => {
                children.push(value);
                children.push(slice);
            }
            NodeKind::Slice { lower, upper, step } => {
                children.extend(lower.as_deref());
                children.extend(upper.as_deref());
                children.extend(step.as_deref());
            }
            NodeKind::TypeVar { bound, .. } => children.extend(bound.as_deref()),
        }
        children
    }
}

impl NodeKind {
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Module { .. } => NodeTag::Module,
            NodeKind::FunctionDef { .. } => NodeTag::FunctionDef,
            NodeKind::ClassDef { .. } => NodeTag::ClassDef,
            NodeKind::Return { .. } => NodeTag::Return,
            NodeKind::Delete { .. } => NodeTag::Delete,
            NodeKind::Assign { .. } => NodeTag::Assign,
            NodeKind::TypeAlias { .. } => NodeTag::TypeAlias,
            NodeKind::AugAssign { .. } => NodeTag::AugAssign,
            NodeKind::AnnAssign { .. } => NodeTag::AnnAssign,
            NodeKind::For { .. } => NodeTag::For,
            NodeKind::While { .. } => NodeTag::While,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::With { .. } => NodeTag::With,
            NodeKind::Match { .. } => NodeTag::Match,
            NodeKind::Raise { .. } => NodeTag::Raise,
            NodeKind::Try { .. } => NodeTag::Try,
            NodeKind::ExceptHandler { .. } => NodeTag::ExceptHandler,
            NodeKind::Assert { .. } => NodeTag::Assert,
            NodeKind::Import { .. } => NodeTag::Import,
            NodeKind::ImportFrom { .. } => NodeTag::ImportFrom,
            NodeKind::Global { .. } => NodeTag::Global,
            NodeKind::Nonlocal { .. } => NodeTag::Nonlocal,
            NodeKind::Expr { .. } => NodeTag::Expr,
            NodeKind::Pass => NodeTag::Pass,
            NodeKind::Break => NodeTag::Break,
            NodeKind::Continue => NodeTag::Continue,
            NodeKind::BoolOp { .. } => NodeTag::BoolOp,
            NodeKind::NamedExpr { .. } => NodeTag::NamedExpr,
            NodeKind::BinOp { .. } => NodeTag::BinOp,
            NodeKind::UnaryOp { .. } => NodeTag::UnaryOp,
            NodeKind::Lambda { .. } => NodeTag::Lambda,
            NodeKind::IfExp { .. } => NodeTag::IfExp,
            NodeKind::Dict { .. } => NodeTag::Dict,
            NodeKind::Set { .. } => NodeTag::Set,
            NodeKind::ListComp { .. } => NodeTag::ListComp,
            NodeKind::SetComp { .. } => NodeTag::SetComp,
            NodeKind::DictComp { .. } => NodeTag::DictComp,
            NodeKind::GeneratorExp { .. } => NodeTag::GeneratorExp,
            NodeKind::Await { .. } => NodeTag::Await,
            NodeKind::Yield { .. } => NodeTag::Yield,
            NodeKind::YieldFrom { .. } => NodeTag::YieldFrom,
            NodeKind::Compare { .. } => NodeTag::Compare,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::FormattedValue { .. } => NodeTag::FormattedValue,
            NodeKind::JoinedStr { .. } => NodeTag::JoinedStr,
            NodeKind::Constant { .. } => NodeTag::Constant,
            NodeKind::Attribute { .. } => NodeTag::Attribute,
            NodeKind::Subscript { .. } => NodeTag::Subscript,
            NodeKind::Starred { .. } => NodeTag::Starred,
            NodeKind::Name { .. } => NodeTag::Name,
            NodeKind::List { .. } => NodeTag::List,
            NodeKind::Tuple { .. } => NodeTag::Tuple,
            NodeKind::Slice { .. } => NodeTag::Slice,
            NodeKind::TypeVar { .. } => NodeTag::TypeVar,
            NodeKind::ParamSpec { .. } => NodeTag::ParamSpec,
            NodeKind::TypeVarTuple { .. } => NodeTag::TypeVarTuple,
        }
    }
}

impl Arguments {
    /// Positional parameter names, positional-only ones first.
    pub fn positional_names(&self) -> Vec<&str> {
        self.posonlyargs
            .iter()
            .chain(&self.args)
            .map(|arg| arg.name.as_str())
            .collect()
    }

    fn collect_children<'a>(&'a self, children: &mut Vec<&'a Node>) {
        let annotation = |arg: &'a Arg| arg.annotation.as_deref();
        children.extend(self.posonlyargs.iter().filter_map(annotation));
        children.extend(self.args.iter().filter_map(annotation));
        children.extend(self.vararg.iter().filter_map(annotation));
        children.extend(self.kwonlyargs.iter().filter_map(annotation));
        children.extend(self.kw_defaults.iter().flatten());
        children.extend(self.kwarg.iter().filter_map(annotation));
        children.extend(&self.defaults);
    }
}

fn collect_generators<'a>(generators: &'a [Comprehension], children: &mut Vec<&'a Node>) {
    for generator in generators {
        children.push(&generator.target);
        children.push(&generator.iter);
        children.extend(&generator.ifs);
    }
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mult => "*",
            BinaryOperator::MatMult => "@",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "**",
            BinaryOperator::LShift => "<<",
            BinaryOperator::RShift => ">>",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::FloorDiv => "//",
        }
    }
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Invert => "~",
            UnaryOperator::Not => "not",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

impl BooleanOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BooleanOperator::And => "and",
            BooleanOperator::Or => "or",
        }
    }
}

impl ComparisonOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "==",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::LtE => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::GtE => ">=",
            ComparisonOperator::Is => "is",
            ComparisonOperator::IsNot => "is not",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "not in",
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unparse())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::builder::*;
    use super::*;

    #[test]
    fn span_end_collapses_onto_start() {
        let span = Span::new(4, 8);
        assert_eq!((span.end_line(), span.end_column()), (4, 8));
        let span = Span::new(4, 8).with_end(6, 2);
        assert_eq!((span.end_line(), span.end_column()), (6, 8));
    }

    #[test]
    fn children_follow_field_order() {
        let node = call("f", vec![name("a"), name("b")]);
        let names: Vec<_> = node.children().iter().filter_map(|c| c.name()).collect();
        assert_eq!(names, vec!["f", "a", "b"]);
    }

    #[test]
    fn call_is_named_after_trailing_attribute() {
        let node = call_with(
            attribute(name("pythia"), "sample"),
            vec![string("x")],
            vec![],
        );
        assert_eq!(node.name(), Some("sample"));
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "kind": "Call",
            "span": {"line": 2, "column": 4},
            "func": {"kind": "Name", "id": "sample"},
            "args": [
                {"kind": "Constant", "value": {"Str": "p"}},
                {"kind": "Call", "func": {"kind": "Name", "id": "Uniform"},
                 "args": [{"kind": "Constant", "value": {"Int": 0}},
                          {"kind": "Constant", "value": {"Int": 1}}]}
            ]
        }"#;
        let node: Node = serde_json::from_str(json).expect("valid tree");
        assert_eq!(node.span, Span::new(2, 4));
        assert_eq!(node.unparse(), "sample('p', Uniform(0, 1))");
    }

    #[test]
    fn abbreviation_truncates_long_text() {
        let node = call("a_rather_long_function_name", vec![name("argument")]);
        assert_eq!(node.abbreviated(12), "a_rather_...");
        assert_eq!(name("x").abbreviated(12), "x");
    }
}
