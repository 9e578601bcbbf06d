//! Turing backend.
//!
//! Turing has no explicit addresses: random variables are named by the
//! assignment target. Addresses are therefore dropped, after checking that the
//! target varies with exactly the same variables as the address did.

use once_cell::sync::Lazy;

use super::{
    assignment, call, function, indexed_address, mappings, renamed, vector_array, with_reciprocal,
};
use crate::ast::{python_string, Node, NodeKind, NodeTag};
use crate::linter::rules::patterns::{DISTRIBUTIONS, INDEXED_ADDRESS};
use crate::translator::arguments::{organize_arguments, Argument, Fallback, KeywordDefault};
use crate::translator::mapping::{
    call_mapping, call_name, render_call, unsupported, CallTable, FunctionCall, MappingError,
    MappingResult,
};
use crate::translator::python::{assigned, tuple_of};
use crate::translator::{Context, Translator};

static CALLS: Lazy<CallTable> = Lazy::new(|| {
    let mut calls = renamed(&[
        ("StudentT", "TDist"),
        ("HyperGeometric", "Hypergeometric"),
        ("MultivariateNormal", "MvNormal"),
    ]);
    for distribution in DISTRIBUTIONS {
        calls
            .entry(*distribution)
            .or_insert_with(|| FunctionCall::new().build());
    }
    calls.insert("sample", call_mapping(sample));
    calls.insert("observe", call_mapping(observe));
    calls.insert("factor", unsupported("Turing"));
    calls.insert("Vector", call_mapping(vector_array));
    calls.insert("Array", call_mapping(vector_array));
    calls.insert(INDEXED_ADDRESS, call_mapping(indexed_address));
    calls.insert("IID", call_mapping(iid));
    calls.insert("Exponential", call_mapping(|node, context| {
        render_call(&with_reciprocal(node, 0), context)
    }));
    calls.insert("Gamma", call_mapping(|node, context| {
        render_call(&with_reciprocal(node, 1), context)
    }));
    calls.insert("HalfCauchy", call_mapping(truncated));
    calls.insert("HalfNormal", call_mapping(truncated));
    calls.insert("Dirichlet", call_mapping(dirichlet));
    calls.insert("Categorical", call_mapping(categorical));
    calls
});

/// The Turing translator.
pub fn translator() -> Translator {
    let mut table = mappings();
    table.insert(NodeTag::FunctionDef, |node, context| {
        function(node, context, &["model"], None)
    });
    table.insert(NodeTag::Assign, sample_assignment);
    table.insert(NodeTag::AnnAssign, sample_assignment);
    table.insert(NodeTag::Call, |node, context| call(node, context, &CALLS));
    Translator::new(table).with_preamble(|context| context.line("using Turing"))
}

// ============================================================================
// ADDRESS CORRELATION
// ============================================================================

/// Names in pre-order, skipping the address constructor.
fn identifiers<'n>(node: &'n Node, found: &mut Vec<&'n str>) {
    if let NodeKind::Name { id } = &node.kind {
        if id != INDEXED_ADDRESS {
            found.push(id);
        }
    }
    for child in node.children() {
        identifiers(child, found);
    }
}

fn rendered_names(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| python_string(name)).collect();
    tuple_of(&quoted)
}

/// Checks that `target` and `address` vary with the same variables.
///
/// The target's leading name is the variable being bound and is not counted.
fn correlate(target: &Node, address: &Node) -> Result<(), MappingError> {
    let mut target_names = Vec::new();
    identifiers(target, &mut target_names);
    let mut address_names = Vec::new();
    identifiers(address, &mut address_names);
    if !target_names.is_empty() {
        target_names.remove(0);
    }
    target_names.sort_unstable();
    address_names.sort_unstable();
    if target_names != address_names {
        return Err(MappingError::fatal(format!(
            "The assignment variable's and address' complexity do not coincide: {} versus {}.",
            rendered_names(&target_names),
            rendered_names(&address_names)
        )));
    }
    Ok(())
}

// ============================================================================
// PRIMITIVES
// ============================================================================

fn sample_assignment(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let sampled = assigned(node).and_then(|(target, value)| {
        let call = value.as_call()?;
        (value.name() == Some("sample")).then_some((target, call))
    });
    let Some((target, call)) = sampled else {
        return assignment(node, context);
    };
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![
            Fallback::unique_address(context.names()),
            Argument::dirac().into(),
        ],
        Vec::new(),
    );
    if let Some(address) = arguments[0].to_node() {
        correlate(target, &address)?;
    }
    let target = context.expression(target)?;
    let distribution = context.render(&arguments[1])?;
    context.line(format!("{target} ~ {distribution}"));
    Ok(None)
}

fn sample(_: &Node, _: &mut Context<'_>) -> Result<String, MappingError> {
    Err(MappingError::fatal(
        "Due to limitations with Turing, `sample` may only be used as a value in assignments.",
    ))
}

fn observe(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "observe"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(0).into()],
        vec![
            KeywordDefault::at(2, "address", Fallback::unique_address(context.names())),
            KeywordDefault::at(3, "distribution", Argument::dirac()),
        ],
    );
    if let (Some(value), Some(address)) = (arguments[0].to_node(), arguments[1].to_node()) {
        correlate(&value, &address)?;
    }
    let value = context.render(&arguments[0])?;
    let distribution = context.render(&arguments[2])?;
    Ok(format!("{value} ~ {distribution}"))
}

fn iid(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "IID"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::dirac().into(), Argument::int(1).into()],
        Vec::new(),
    );
    let distribution = context.render(&arguments[0])?;
    let size = match arguments[1].as_node().map(|node| &node.kind) {
        Some(NodeKind::List { elts } | NodeKind::Tuple { elts }) => elts
            .iter()
            .map(|element| context.expression(element))
            .collect::<Result<Vec<_>, _>>()?
            .join(", "),
        _ => context.render(&arguments[1])?,
    };
    Ok(format!("filldist({distribution}, {size})"))
}

// ============================================================================
// DISTRIBUTIONS
// ============================================================================

/// `HalfX(loc, s)` as `X` truncated below at its location (0 by default).
fn truncated(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let name = call_name(node)?;
    let base = name.strip_prefix("Half").unwrap_or(name).to_string();
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "truncated"))?;
    let mut arguments = organize_arguments(call.args, call.keywords, Vec::new(), Vec::new());
    let location = if arguments.len() >= 2 {
        context.render(&arguments[0])?
    } else {
        arguments.insert(0, Argument::int(0));
        "0".to_string()
    };
    let distribution = FunctionCall::new()
        .named(base)
        .render_with(node, context, &arguments)?;
    Ok(format!("Truncated({distribution}, {location}, +Inf)"))
}

fn dirichlet(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "Dirichlet"))?;
    let mut arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(1).into()],
        vec![KeywordDefault::at(2, "size", Argument::int(1))],
    );
    arguments.swap(0, 1);
    FunctionCall::new().render_with(node, context, &arguments)
}

/// Renders a zero-based categorical over the probabilities in a placeholder,
/// so they are evaluated once. Emits the placeholder's assignment.
pub(super) fn zero_based_categorical(
    node: &Node,
    context: &mut Context<'_>,
    function_name: &str,
) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "Categorical"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::Rendered("[]".to_string()).into()],
        Vec::new(),
    );
    let mut rendered = context.render_all(&arguments)?;
    if !rendered.is_empty() {
        let placeholder = format!("__categorical{}", context.unique_name());
        let probabilities = rendered.remove(0);
        context.line(format!("{placeholder} = {probabilities}"));
        rendered.splice(
            0..0,
            [format!("0:length({placeholder})-1"), placeholder],
        );
    }
    let rendered: Vec<Argument<'_>> = rendered.into_iter().map(Argument::Rendered).collect();
    FunctionCall::new()
        .named(function_name)
        .render_with(node, context, &rendered)
}

fn categorical(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    zero_based_categorical(node, context, "DiscreteNonParametric")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::builder::{call};

    fn translate(body: Vec<Node>) -> Result<String, crate::translator::TranslationError> {
        translator().try_translate(&module(vec![model("m", &["x"], body)]))
    }

    #[test]
    fn samples_bind_their_target() {
        let body = vec![assign(
            name("rate"),
            call("sample", vec![string("rate"), call("Exponential", vec![float(0.5)])]),
        )];
        assert_eq!(
            translate(body).unwrap(),
            "using Turing\n@model function m(x)\n    rate ~ Exponential((1) / (0.5))\nend"
        );
    }

    #[test]
    fn uncorrelated_addresses_are_fatal() {
        let indexed = call(INDEXED_ADDRESS, vec![string("y"), name("j")]);
        let body = vec![assign(
            subscript(name("y"), name("i")),
            call("sample", vec![indexed, call("Normal", vec![int(0), int(1)])]),
        )];
        let error = translate(body).unwrap_err();
        assert_eq!(
            error.to_string(),
            "The assignment variable's and address' complexity do not coincide: ('i',) versus ('j',)."
        );
    }

    #[test]
    fn misplaced_samples_are_fatal() {
        let body = vec![return_value(call(
            "sample",
            vec![string("a"), call("Normal", vec![int(0), int(1)])],
        ))];
        let error = translate(body).unwrap_err();
        assert!(error.to_string().starts_with("Due to limitations with Turing"));
    }

    #[test]
    fn half_distributions_are_truncated() {
        let body = vec![assign(
            name("s"),
            call("sample", vec![string("s"), call("HalfCauchy", vec![int(2)])]),
        )];
        assert!(translate(body)
            .unwrap()
            .contains("s ~ Truncated(Cauchy(0, 2), 0, +Inf)"));
    }

    #[test]
    fn categoricals_are_zero_based() {
        let body = vec![assign(
            name("k"),
            call("sample", vec![string("k"), call("Categorical", vec![name("x")])]),
        )];
        let translation = translate(body).unwrap();
        assert!(translation.contains(
            "    __categorical__context__unique_address_1 = x\n    k ~ DiscreteNonParametric(0:length(__categorical__context__unique_address_1)-1, __categorical__context__unique_address_1)"
        ));
    }
}
