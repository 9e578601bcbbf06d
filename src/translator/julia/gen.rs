//! Gen backends: the generative function itself and the choicemap that
//! collects its observations as constraints.

use once_cell::sync::Lazy;

use super::turing::zero_based_categorical;
use super::{
    assignment, call, function, indexed_address, mappings, renamed, vector_array, with_reciprocal,
};
use crate::ast::{Node, NodeKind, NodeTag};
use crate::linter::rules::patterns::{is_function_called, INDEXED_ADDRESS};
use crate::translator::arguments::{organize_arguments, Argument, Fallback, KeywordDefault};
use crate::translator::mapping::{
    call_mapping, unsupported, CallTable, FunctionCall, MappingError, MappingResult,
};
use crate::translator::python::{assigned, standalone_expression};
use crate::translator::{Context, Translator};

const CONSTRAINTS: &str = "__observe_constraints";

static CALLS: Lazy<CallTable> = Lazy::new(|| {
    let mut calls = renamed(&[
        ("Beta", "beta"),
        ("Cauchy", "cauchy"),
        ("Exponential", "exponential"),
        ("InverseGamma", "inv_gamma"),
        ("Normal", "normal"),
        ("Uniform", "uniform"),
        ("Bernoulli", "bernoulli"),
        ("Binomial", "binom"),
        ("DiscreteUniform", "uniform_discrete"),
        ("Geometric", "geometric"),
        ("Poisson", "poisson"),
        ("MultivariateNormal", "mvnormal"),
    ]);
    for function in [
        "factor",
        "IID",
        "Dirac",
        "HalfCauchy",
        "HalfNormal",
        "StudentT",
        "HyperGeometric",
    ] {
        calls.insert(function, unsupported("Gen"));
    }
    calls.insert("sample", call_mapping(sample));
    calls.insert("observe", call_mapping(observe));
    calls.insert("Vector", call_mapping(vector_array));
    calls.insert("Array", call_mapping(vector_array));
    calls.insert(INDEXED_ADDRESS, call_mapping(indexed_address));
    calls.insert(
        "Gamma",
        call_mapping(|node, context| {
            let reciprocal = with_reciprocal(node, 1);
            FunctionCall::new()
                .named("gamma")
                .render(&reciprocal, context)
        }),
    );
    calls.insert("Dirichlet", call_mapping(dirichlet));
    calls.insert("Categorical", call_mapping(categorical));
    calls
});

/// Observations only; everything else in the model is dropped.
static CHOICEMAP_CALLS: Lazy<CallTable> = Lazy::new(|| {
    let mut calls = CALLS.clone();
    calls.insert("observe", call_mapping(constrain));
    calls
});

/// The Gen translator.
pub fn translator() -> Translator {
    let mut table = mappings();
    table.insert(NodeTag::FunctionDef, |node, context| {
        function(node, context, &["gen"], None)
    });
    table.insert(NodeTag::Call, |node, context| call(node, context, &CALLS));
    Translator::new(table).with_preamble(|context| {
        context.line("using Gen");
        context.line("using Distributions");
    })
}

/// Translates the model into `__choicemap_aggregation`, a plain function that
/// fills `__observe_constraints` with the observed values by address.
pub fn choicemap_translator() -> Translator {
    let mut table = mappings();
    table.insert(NodeTag::FunctionDef, |node, context| {
        function(node, context, &[], Some("__choicemap_aggregation"))
    });
    table.insert(NodeTag::Assign, skip_samples);
    table.insert(NodeTag::AnnAssign, skip_samples);
    table.insert(NodeTag::Expr, observations_only);
    table.insert(NodeTag::Return, |_, context| {
        context.line("return");
        Ok(None)
    });
    table.insert(NodeTag::Call, |node, context| call(node, context, &CHOICEMAP_CALLS));
    Translator::new(table)
        .with_preamble(|context| context.line(format!("{CONSTRAINTS} = Gen.choicemap()")))
}

fn sample(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "sample"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![
            Fallback::unique_address(context.names()),
            Argument::dirac().into(),
        ],
        Vec::new(),
    );
    let address = context.render(&arguments[0])?;
    let distribution = context.render(&arguments[1])?;
    Ok(format!("{{{address}}} ~ {distribution}"))
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
    let address = context.render(&arguments[1])?;
    let distribution = context.render(&arguments[2])?;
    Ok(format!("{{{address}}} ~ {distribution}"))
}

/// `Dirichlet(α, size)` as the symmetric `dirichlet(ones(size) * (α))`.
fn dirichlet(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "Dirichlet"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(1).into()],
        vec![KeywordDefault::at(2, "size", Argument::int(1))],
    );
    let mut rendered = context.render_all(&arguments)?;
    let fill = rendered.remove(0);
    let size = rendered.remove(0);
    rendered.insert(0, format!("ones({size}) * ({fill})"));
    let rendered: Vec<Argument<'_>> = rendered.into_iter().map(Argument::Rendered).collect();
    FunctionCall::new()
        .named("dirichlet")
        .render_with(node, context, &rendered)
}

fn categorical(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    context.in_preamble(true, |preamble| {
        preamble.line("@dist labeled_categorical(labels, probs) = labels[categorical(probs)]")
    });
    zero_based_categorical(node, context, "labeled_categorical")
}

// ============================================================================
// CHOICEMAP
// ============================================================================

fn skip_samples(node: &Node, context: &mut Context<'_>) -> MappingResult {
    let sampled = assigned(node).is_some_and(|(_, value)| is_function_called(value, "sample"));
    if sampled {
        return Ok(None);
    }
    assignment(node, context)
}

fn observations_only(node: &Node, context: &mut Context<'_>) -> MappingResult {
    match &node.kind {
        NodeKind::Expr { value } if value.as_call().is_some() => {
            if is_function_called(value, "observe") {
                standalone_expression(node, context)
            } else {
                Ok(None)
            }
        }
        _ => standalone_expression(node, context),
    }
}

fn constrain(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = node
        .as_call()
        .ok_or_else(|| MappingError::mismatch(node, "observe"))?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(0).into()],
        vec![KeywordDefault::at(
            2,
            "address",
            Fallback::unique_address(context.names()),
        )],
    );
    let value = context.render(&arguments[0])?;
    let address = context.render(&arguments[1])?;
    Ok(format!("{CONSTRAINTS}[{address}] = {value}"))
}
