//! Mappings shared by Julia-based frameworks (1-indexed).
//!
//! Indices are shifted by one at every subscript and `range` loops become
//! inclusive ranges ending one before the exclusive bound.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::arguments::{organize_arguments, Argument, Fallback, KeywordDefault};
use super::mapping::{CallTable, FunctionCall, MappingError, MappingResult, MappingTable};
use super::python::{assigned, range_bounds};
use super::Context;
use crate::ast::builder::{binary, int};
use crate::ast::{
    julia_string, BinaryOperator, BooleanOperator, ComparisonOperator, Constant, Node, NodeKind,
    NodeTag, UnaryOperator,
};

pub mod gen;
pub mod turing;

/// Calls every Julia framework understands. They must be flat, since a
/// qualified callee may well be a different function.
static DEFAULT_CALLS: Lazy<CallTable> = Lazy::new(|| {
    let mut calls = CallTable::new();
    for function in ["abs", "max", "min", "sum", "round"] {
        calls.insert(function, FunctionCall::new().flat().build());
    }
    for (function, renamed) in [("len", "length"), ("sorted", "sort"), ("print", "println")] {
        calls.insert(function, FunctionCall::new().named(renamed).flat().build());
    }
    calls
});

/// The generic Julia mapping table; frameworks add their functions and calls.
pub fn mappings() -> MappingTable {
    let mut table = MappingTable::new();
    table.insert(NodeTag::Module, super::python::module);
    table.insert(NodeTag::FunctionDef, |node, context| function(node, context, &[], None));
    table.insert(NodeTag::If, if_statement);
    table.insert(NodeTag::While, while_loop);
    table.insert(NodeTag::For, for_loop);
    table.insert(NodeTag::Continue, |_, context| {
        context.line("continue");
        Ok(None)
    });
    table.insert(NodeTag::Break, |_, context| {
        context.line("break");
        Ok(None)
    });
    table.insert(NodeTag::Return, return_statement);
    table.insert(NodeTag::Assign, assignment);
    table.insert(NodeTag::AnnAssign, assignment);
    table.insert(NodeTag::Expr, super::python::standalone_expression);
    table.insert(NodeTag::Name, name);
    table.insert(NodeTag::Constant, constant);
    table.insert(NodeTag::Tuple, tuple);
    table.insert(NodeTag::List, list);
    table.insert(NodeTag::Attribute, attribute);
    table.insert(NodeTag::Subscript, subscript);
    table.insert(NodeTag::Slice, slice);
    table.insert(NodeTag::BinOp, operators);
    table.insert(NodeTag::Compare, operators);
    table.insert(NodeTag::BoolOp, operators);
    table.insert(NodeTag::UnaryOp, unary_operator);
    table.insert(NodeTag::Call, |node, context| call(node, context, &CallTable::new()));
    table
}

// ============================================================================
// STATEMENTS
// ============================================================================

/// Renders `[@macro ...] function name(params)`, its body and `end`.
///
/// `rename` replaces the function's own name.
pub fn function(
    node: &Node,
    context: &mut Context<'_>,
    macros: &[&str],
    rename: Option<&str>,
) -> MappingResult {
    let NodeKind::FunctionDef { name, args, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "function"));
    };
    let mut header: String = macros
        .iter()
        .filter(|macro_name| !macro_name.is_empty())
        .map(|macro_name| format!("@{} ", macro_name.trim_start_matches('@')))
        .collect();
    header.push_str(&format!(
        "function {}({})",
        rename.unwrap_or(name),
        args.positional_names().join(", ")
    ));
    context.line(header);
    context.block(body)?;
    context.line("end");
    Ok(None)
}

fn if_statement(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::If { test, body, orelse } = &node.kind else {
        return Err(MappingError::mismatch(node, "if"));
    };
    let test = context.expression(test)?;
    context.line(format!("if {test}"));
    context.block(body)?;
    if !orelse.is_empty() {
        context.line("else");
        context.block(orelse)?;
    }
    context.line("end");
    Ok(None)
}

fn while_loop(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::While { test, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "while"));
    };
    let test = context.expression(test)?;
    context.line(format!("while {test}"));
    context.block(body)?;
    context.line("end");
    Ok(None)
}

fn for_loop(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::For { target, iter, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "for"));
    };
    let target = context.expression(target)?;
    // Arbitrary iterators are passed through as is.
    let header = match range_bounds(iter, context)? {
        Some((start, end, step)) => format!("for {target} = {start}:{step}:({end})-1"),
        None => format!("for {target} in {}", context.expression(iter)?),
    };
    context.line(header);
    context.block(body)?;
    context.line("end");
    Ok(None)
}

pub fn return_statement(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Return { value } = &node.kind else {
        return Err(MappingError::mismatch(node, "return"));
    };
    let value = match value {
        Some(value) => context.expression(value)?,
        None => "nothing".to_string(),
    };
    context.line(format!("return {value}"));
    Ok(None)
}

pub fn assignment(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let Some((target, value)) = assigned(node) else {
        return Err(MappingError::mismatch(node, "assignment"));
    };
    let target = context.expression(target)?;
    let value = context.expression(value)?;
    context.line(format!("{target} = {value}"));
    Ok(None)
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn name(node: &Node, _: &mut Context<'_>) -> MappingResult {
    match &node.kind {
        NodeKind::Name { id } => Ok(Some(id.clone())),
        _ => Err(MappingError::mismatch(node, "name")),
    }
}

fn constant(node: &Node, _: &mut Context<'_>) -> MappingResult {
    let NodeKind::Constant { value } = &node.kind else {
        return Err(MappingError::mismatch(node, "constant"));
    };
    let rendered = match value {
        Constant::Str(text) => julia_string(text),
        Constant::Bool(true) => "true".to_string(),
        Constant::Bool(false) => "false".to_string(),
        Constant::None => "nothing".to_string(),
        other => other.to_string(),
    };
    Ok(Some(rendered))
}

fn elements(elements: &[Node], context: &mut Context<'_>) -> Result<Vec<String>, MappingError> {
    elements
        .iter()
        .map(|element| context.expression(element))
        .collect()
}

fn tuple(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Tuple { elts } = &node.kind else {
        return Err(MappingError::mismatch(node, "tuple"));
    };
    Ok(Some(super::python::tuple_of(&elements(elts, context)?)))
}

fn list(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::List { elts } = &node.kind else {
        return Err(MappingError::mismatch(node, "list"));
    };
    Ok(Some(format!("[{}]", elements(elts, context)?.join(", "))))
}

fn attribute(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Attribute { value, attr } = &node.kind else {
        return Err(MappingError::mismatch(node, "attribute"));
    };
    Ok(Some(format!("{}.{attr}", context.expression(value)?)))
}

fn subscript(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Subscript { value, slice } = &node.kind else {
        return Err(MappingError::mismatch(node, "subscript"));
    };
    let value = context.expression(value)?;
    let indices: &[Node] = match &slice.kind {
        NodeKind::Tuple { elts } => elts,
        _ => std::slice::from_ref(slice.as_ref()),
    };
    let mut rendered = Vec::with_capacity(indices.len());
    for index in indices {
        let index_text = context.expression(index)?;
        rendered.push(match index.kind {
            NodeKind::Slice { .. } => index_text,
            _ => format!("({index_text})+1"),
        });
    }
    Ok(Some(format!("{value}[{}]", rendered.join(", "))))
}

/// Negative bounds pass through untouched; they are not valid Julia.
fn slice(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Slice { lower, upper, step } = &node.kind else {
        return Err(MappingError::mismatch(node, "slice"));
    };
    let lower = match lower {
        Some(lower) => format!("({})+1", context.expression(lower)?),
        None => "begin".to_string(),
    };
    let upper = match upper {
        Some(upper) => format!("({})", context.expression(upper)?),
        None => "end".to_string(),
    };
    let step = match step {
        Some(step) => context.expression(step)?,
        None => "1".to_string(),
    };
    Ok(Some(format!("{lower}:{step}:{upper}")))
}

fn binary_symbol(op: BinaryOperator) -> Option<&'static str> {
    use BinaryOperator::*;
    match op {
        Add => Some("+"),
        Sub => Some("-"),
        Mult => Some("*"),
        Div => Some("/"),
        FloorDiv => Some("÷"),
        Mod => Some("%"),
        Pow => Some("^"),
        _ => None,
    }
}

fn comparison_symbol(op: ComparisonOperator) -> Option<&'static str> {
    use ComparisonOperator::*;
    match op {
        Eq | NotEq | Lt | LtE | Gt | GtE => Some(op.symbol()),
        _ => None,
    }
}

fn boolean_symbol(op: BooleanOperator) -> &'static str {
    match op {
        BooleanOperator::And => "&&",
        BooleanOperator::Or => "||",
    }
}

fn unmapped(node: &Node, symbol: &str) -> MappingError {
    MappingError::warning(node, format!("No Julia equivalent for operator `{symbol}`"))
}

fn operators(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let rendered = match &node.kind {
        NodeKind::BinOp { left, op, right } => {
            let symbol = binary_symbol(*op).ok_or_else(|| unmapped(node, op.symbol()))?;
            format!(
                "({}) {symbol} ({})",
                context.expression(left)?,
                context.expression(right)?
            )
        }
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut rendered = format!("({})", context.expression(left)?);
            for (op, right) in ops.iter().zip(comparators) {
                let symbol = comparison_symbol(*op).ok_or_else(|| unmapped(node, op.symbol()))?;
                rendered.push_str(&format!(" {symbol} ({})", context.expression(right)?));
            }
            rendered
        }
        NodeKind::BoolOp { op, values } => elements(values, context)?
            .iter()
            .map(|value| format!("({value})"))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", boolean_symbol(*op))),
        _ => return Err(MappingError::mismatch(node, "operators")),
    };
    Ok(Some(rendered))
}

fn unary_operator(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::UnaryOp { op, operand } = &node.kind else {
        return Err(MappingError::mismatch(node, "unary operator"));
    };
    let symbol = match op {
        UnaryOperator::UAdd => "+",
        UnaryOperator::USub => "-",
        UnaryOperator::Not => "!",
        UnaryOperator::Invert => return Err(unmapped(node, op.symbol())),
    };
    Ok(Some(format!("{symbol} ({})", context.expression(operand)?)))
}

/// Renders a call through `calls`, falling back to the default calls.
///
/// Unknown calls are rendered unparsed with a warning.
pub fn call(node: &Node, context: &mut Context<'_>, calls: &CallTable) -> MappingResult {
    if node.as_call().is_none() {
        return Err(MappingError::mismatch(node, "call"));
    }
    let name = node.name().unwrap_or_default();
    let mapping = calls.get(name).or_else(|| DEFAULT_CALLS.get(name));
    match mapping {
        Some(mapping) => mapping(node, context).map(Some),
        None => Err(MappingError::warning(
            node,
            format!("Unknown function `{name}` called."),
        )),
    }
}

// ============================================================================
// SHARED FRAMEWORK CALLS
// ============================================================================

fn datatype(node: &Node) -> String {
    match &node.kind {
        NodeKind::Name { id } => match id.as_str() {
            "int" => "Int".to_string(),
            "float" => "Float64".to_string(),
            "bool" => "Bool".to_string(),
            other => other.to_string(),
        },
        _ => node.unparse(),
    }
}

/// `Vector`/`Array` as `fill(..)`, typed through `fill!` when `t` is given.
pub fn vector_array(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "Vector"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(1).into()],
        vec![
            KeywordDefault::at(2, "fill", Argument::int(0)),
            KeywordDefault::Named("t"),
        ],
    );
    let size = context.render(&arguments[0])?;
    let fill = context.render(&arguments[1])?;
    match arguments.get(2).and_then(Argument::as_node) {
        Some(datatype_node) => Ok(format!(
            "fill!(Array{{{}}}(undef, {size}), {fill})",
            datatype(datatype_node)
        )),
        None => Ok(format!("fill({fill}, {size})")),
    }
}

/// `IndexedAddress(a, i, j)` as the interpolated string `"$(a)[$(i),$(j)]"`.
pub fn indexed_address(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "IndexedAddress"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Fallback::unique_address(context.names())],
        Vec::new(),
    );
    let rendered = context.render_all(&arguments)?;
    let interpolated: Vec<String> = rendered.iter().map(|part| format!("$({part})")).collect();
    let (address, indices) = interpolated
        .split_first()
        .ok_or_else(|| MappingError::mismatch(node, "IndexedAddress"))?;
    Ok(format!("\"{address}[{}]\"", indices.join(",")))
}

/// A copy of the call whose argument at `position` is replaced by its
/// reciprocal `(1) / (x)`.
pub fn with_reciprocal(node: &Node, position: usize) -> Node {
    let mut node = node.clone();
    if let NodeKind::Call { args, .. } = &mut node.kind {
        if let Some(argument) = args.get_mut(position) {
            let original = std::mem::replace(argument, int(1));
            *argument = binary(int(1), BinaryOperator::Div, original);
        }
    }
    node
}

/// A call table that renames each distribution.
pub fn renamed(names: &[(&'static str, &'static str)]) -> CallTable {
    names
        .iter()
        .map(|(distribution, renamed)| (*distribution, FunctionCall::new().named(*renamed).build()))
        .collect::<HashMap<_, _>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::builder::{attribute, call, list, name, slice, subscript, tuple};
    use crate::translator::Translator;

    fn translate(tree: &Node) -> Option<String> {
        Translator::new(mappings()).translate(tree)
    }

    #[test]
    fn subscripts_are_shifted() {
        let multi = subscript(name("m"), tuple(vec![name("i"), int(0)]));
        assert_eq!(translate(&multi).unwrap(), "m[(i)+1, (0)+1]");
        let sliced = subscript(name("m"), slice(Some(int(1)), None, None));
        assert_eq!(translate(&sliced).unwrap(), "m[(1)+1:1:end]");
    }

    #[test]
    fn literals_use_julia_spelling() {
        let values = list(vec![boolean(true), none(), string("$x \"y\""), float(0.5)]);
        assert_eq!(
            translate(&values).unwrap(),
            r#"[true, nothing, "\$x \"y\"", 0.5]"#
        );
    }

    #[test]
    fn operators_use_julia_spelling() {
        let power = binary(name("a"), BinaryOperator::Pow, int(2));
        let floor = binary(name("a"), BinaryOperator::FloorDiv, int(2));
        let test = boolean_operation(
            BooleanOperator::Or,
            vec![unary(UnaryOperator::Not, power), floor],
        );
        assert_eq!(translate(&test).unwrap(), "(! ((a) ^ (2))) || ((a) ÷ (2))");
    }

    #[test]
    fn loops_and_conditionals_are_closed() {
        let tree = module(vec![for_range(
            "i",
            vec![name("n")],
            vec![if_else(
                compare(name("i"), ComparisonOperator::Gt, int(2)),
                vec![Node::new(NodeKind::Break)],
                vec![Node::new(NodeKind::Continue)],
            )],
        )]);
        assert_eq!(
            translate(&tree).unwrap(),
            "for i = 0:1:(n)-1\n    if (i) > (2)\n        break\n    else\n        continue\n    end\nend"
        );
    }

    #[test]
    fn unknown_and_qualified_calls_fall_back() {
        let tree = module(vec![
            expression(call("mystery", vec![int(1)])),
            expression(call_with(attribute(name("math"), "abs"), vec![int(1)], vec![])),
            expression(call("len", vec![name("xs")])),
        ]);
        assert_eq!(
            translate(&tree).unwrap(),
            "mystery(1)\nmath.abs(1)\nlength(xs)"
        );
    }
}
