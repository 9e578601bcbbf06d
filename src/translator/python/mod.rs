//! Mappings shared by Python-based frameworks (0-indexed).
//!
//! Names and constants are left unmapped: their unparse already is Python.
//! Operands are parenthesized unconditionally so operator precedence never has
//! to be reasoned about.

use super::arguments::canonical_arguments;
use super::mapping::{CallTable, MappingError, MappingResult, MappingTable};
use super::Context;
use crate::ast::{Node, NodeKind, NodeTag};

pub mod pyro;

/// The generic Python mapping table.
///
/// Calls are rendered under the callee's own rendering; frameworks replace the
/// [`NodeTag::Call`] entry to consult their call table first.
pub fn mappings() -> MappingTable {
    let mut table = MappingTable::new();
    table.insert(NodeTag::Module, module);
    table.insert(NodeTag::FunctionDef, function);
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
    table.insert(NodeTag::Expr, standalone_expression);
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

pub fn module(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Module { body } = &node.kind else {
        return Err(MappingError::mismatch(node, "module"));
    };
    for statement in body {
        context.visit(statement)?;
    }
    Ok(None)
}

fn function(node: &Node, context: &mut Context<'_>) -> MappingResult {
    function_with(node, context, &[])
}

/// Renders a function definition, preceded by `decorators`.
///
/// Decorators of the original definition are dropped.
pub fn function_with(node: &Node, context: &mut Context<'_>, decorators: &[&str]) -> MappingResult {
    let NodeKind::FunctionDef { name, args, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "function"));
    };
    for decorator in decorators {
        context.line(format!("@{}", decorator.trim_start_matches('@')));
    }
    context.line(format!("def {name}({}):", args.positional_names().join(", ")));
    context.block(body)?;
    Ok(None)
}

fn if_statement(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::If { test, body, orelse } = &node.kind else {
        return Err(MappingError::mismatch(node, "if"));
    };
    let test = context.expression(test)?;
    context.line(format!("if {test}:"));
    context.block(body)?;
    if !orelse.is_empty() {
        context.line("else:");
        context.block(orelse)?;
    }
    Ok(None)
}

fn while_loop(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::While { test, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "while"));
    };
    let test = context.expression(test)?;
    context.line(format!("while {test}:"));
    context.block(body)?;
    Ok(None)
}

fn for_loop(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::For { target, iter, body, .. } = &node.kind else {
        return Err(MappingError::mismatch(node, "for"));
    };
    let target = context.expression(target)?;
    let header = match range_bounds(iter, context)? {
        Some((start, end, step)) => format!("for {target} in range({start}, {end}, {step}):"),
        None => format!("for {target} in {}:", context.expression(iter)?),
    };
    context.line(header);
    context.block(body)?;
    Ok(None)
}

/// `(start, end, step)` of a call to `range`, rendered.
///
/// `None` when `iter` is not such a call; a warning when it has no or more
/// than three arguments.
pub fn range_bounds(
    iter: &Node,
    context: &mut Context<'_>,
) -> Result<Option<(String, String, String)>, MappingError> {
    let Some(call) = iter.as_call() else {
        return Ok(None);
    };
    if !matches!(&call.func.kind, NodeKind::Name { id } if id == "range") {
        return Ok(None);
    }
    let bounds = match call.args {
        [end] => ("0".to_string(), context.expression(end)?, "1".to_string()),
        [start, end] => (
            context.expression(start)?,
            context.expression(end)?,
            "1".to_string(),
        ),
        [start, end, step] => (
            context.expression(start)?,
            context.expression(end)?,
            context.expression(step)?,
        ),
        _ => {
            return Err(MappingError::warning(
                iter,
                format!("Unexpected number of arguments to `range`: {}", call.args.len()),
            ))
        }
    };
    Ok(Some(bounds))
}

fn return_statement(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Return { value } = &node.kind else {
        return Err(MappingError::mismatch(node, "return"));
    };
    let value = match value {
        Some(value) => context.expression(value)?,
        None => "None".to_string(),
    };
    context.line(format!("return {value}"));
    Ok(None)
}

/// The target and value of an assignment that has a value.
pub fn assigned(node: &Node) -> Option<(&Node, &Node)> {
    match &node.kind {
        NodeKind::Assign { targets, value } => Some((targets.first()?, value.as_ref())),
        NodeKind::AnnAssign {
            target,
            value: Some(value),
            ..
        } => Some((target.as_ref(), value.as_ref())),
        _ => None,
    }
}

fn assignment(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let Some((target, value)) = assigned(node) else {
        return Err(MappingError::mismatch(node, "assignment"));
    };
    let target = context.expression(target)?;
    let value = context.expression(value)?;
    context.line(format!("{target} = {value}"));
    Ok(None)
}

pub fn standalone_expression(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Expr { value } = &node.kind else {
        return Err(MappingError::mismatch(node, "expression"));
    };
    let value = context.expression(value)?;
    context.line(value);
    Ok(None)
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn elements(elements: &[Node], context: &mut Context<'_>) -> Result<Vec<String>, MappingError> {
    elements
        .iter()
        .map(|element| context.expression(element))
        .collect()
}

/// Renders tuple elements, keeping the trailing comma of 1-tuples.
pub fn tuple_of(rendered: &[String]) -> String {
    match rendered {
        [single] => format!("({single},)"),
        _ => format!("({})", rendered.join(", ")),
    }
}

fn tuple(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Tuple { elts } = &node.kind else {
        return Err(MappingError::mismatch(node, "tuple"));
    };
    Ok(Some(tuple_of(&elements(elts, context)?)))
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
    let indices = match &slice.kind {
        NodeKind::Tuple { elts } => elements(elts, context)?,
        _ => vec![context.expression(slice)?],
    };
    Ok(Some(format!("{value}[{}]", indices.join(", "))))
}

fn slice(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::Slice { lower, upper, step } = &node.kind else {
        return Err(MappingError::mismatch(node, "slice"));
    };
    let mut parts = Vec::with_capacity(3);
    for part in [lower, upper, step] {
        parts.push(match part {
            Some(part) => context.expression(part)?,
            None => String::new(),
        });
    }
    Ok(Some(parts.join(":")))
}

fn operators(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let rendered = match &node.kind {
        NodeKind::BinOp { left, op, right } => format!(
            "({}) {} ({})",
            context.expression(left)?,
            op.symbol(),
            context.expression(right)?
        ),
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut rendered = format!("({})", context.expression(left)?);
            for (op, right) in ops.iter().zip(comparators) {
                rendered.push_str(&format!(" {} ({})", op.symbol(), context.expression(right)?));
            }
            rendered
        }
        NodeKind::BoolOp { op, values } => elements(values, context)?
            .iter()
            .map(|value| format!("({value})"))
            .collect::<Vec<_>>()
            .join(&format!(" {} ", op.symbol())),
        _ => return Err(MappingError::mismatch(node, "operators")),
    };
    Ok(Some(rendered))
}

fn unary_operator(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let NodeKind::UnaryOp { op, operand } = &node.kind else {
        return Err(MappingError::mismatch(node, "unary operator"));
    };
    Ok(Some(format!("{} ({})", op.symbol(), context.expression(operand)?)))
}

/// Renders a call through `calls` when its name is registered, otherwise as
/// the rendered callee applied to the canonical arguments.
pub fn call(node: &Node, context: &mut Context<'_>, calls: &CallTable) -> MappingResult {
    let Some(parts) = node.as_call() else {
        return Err(MappingError::mismatch(node, "call"));
    };
    if let Some(mapping) = node.name().and_then(|name| calls.get(name)) {
        return mapping(node, context).map(Some);
    }
    let callee = context.expression(parts.func)?;
    let arguments = canonical_arguments(parts, context.names());
    let arguments = context.render_all(&arguments)?;
    Ok(Some(format!("{callee}({})", arguments.join(", "))))
}
