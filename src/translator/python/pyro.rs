//! Pyro backend.

use once_cell::sync::Lazy;

use super::{call, mappings, tuple_of};
use crate::ast::{CallParts, Constant, Node, NodeKind, NodeTag};
use crate::linter::rules::patterns::DISTRIBUTIONS;
use crate::translator::arguments::{
    canonical_arguments, organize_arguments, Argument, Fallback, KeywordDefault,
};
use crate::translator::mapping::{
    call_mapping, call_name, unsupported, CallTable, FunctionCall, MappingError,
};
use crate::translator::{Context, Translator};

const PYRO: &str = "pyro.";
const DISTRIBUTION: &str = "dist.";
const TORCH: &str = "torch.";

static CALLS: Lazy<CallTable> = Lazy::new(|| {
    let mut calls = CallTable::new();
    for distribution in DISTRIBUTIONS {
        calls.insert(
            *distribution,
            FunctionCall::new()
                .named(format!("{DISTRIBUTION}{distribution}"))
                .build(),
        );
    }
    calls.insert("sample", FunctionCall::new().named(format!("{PYRO}sample")).build());
    calls.insert("observe", call_mapping(observe));
    calls.insert("factor", call_mapping(factor));
    calls.insert("Vector", call_mapping(vector_array));
    calls.insert("Array", call_mapping(vector_array));
    calls.insert("IndexedAddress", call_mapping(indexed_address));
    calls.insert("IID", call_mapping(iid));
    calls.insert("Dirac", call_mapping(dirac));
    calls.insert("HalfCauchy", call_mapping(half_distribution));
    calls.insert("HalfNormal", call_mapping(half_distribution));
    calls.insert("Dirichlet", call_mapping(tensor_arguments));
    calls.insert("MultivariateNormal", call_mapping(tensor_arguments));
    calls.insert("DiscreteUniform", unsupported("Pyro"));
    calls.insert("HyperGeometric", unsupported("Pyro"));
    calls
});

/// The Pyro translator.
pub fn translator() -> Translator {
    let mut table = mappings();
    table.insert(NodeTag::Call, |node, context| call(node, context, &CALLS));
    Translator::new(table).with_preamble(|context| {
        context.line("import pyro");
        context.line("import pyro.distributions as dist");
    })
}

fn import_torch(context: &mut Context<'_>) {
    context.in_preamble(true, |preamble| preamble.line("import torch"));
}

fn parts(node: &Node) -> Result<CallParts<'_>, MappingError> {
    node.as_call()
        .ok_or_else(|| MappingError::mismatch(node, "call"))
}

fn observe(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = parts(node)?;
    let names = context.names();
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(0).into()],
        vec![
            KeywordDefault::at(2, "address", Fallback::unique_address(names)),
            KeywordDefault::at(3, "distribution", Argument::dirac()),
        ],
    );
    let mut rendered = context.render_all(&arguments)?;
    let value = rendered.remove(0);
    rendered.push(format!("obs={value}"));
    let rendered: Vec<Argument<'_>> = rendered.into_iter().map(Argument::Rendered).collect();
    FunctionCall::new()
        .named(format!("{PYRO}sample"))
        .render_with(node, context, &rendered)
}

fn factor(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = parts(node)?;
    let mut arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(0).into()],
        vec![KeywordDefault::at(
            2,
            "address",
            Fallback::unique_address(context.names()),
        )],
    );
    arguments.swap(0, 1);
    FunctionCall::new()
        .named(format!("{PYRO}factor"))
        .render_with(node, context, &arguments)
}

fn vector_array(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    import_torch(context);
    let call = parts(node)?;
    let mut arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::int(1).into()],
        vec![
            KeywordDefault::at(2, "fill", Argument::int(0)),
            KeywordDefault::Named("t"),
        ],
    );
    let datatype = (arguments.len() >= 3).then(|| arguments.remove(2));
    if !arguments[0].is_sequence() {
        let size = context.render(&arguments[0])?;
        arguments[0] = Argument::Rendered(tuple_of(&[size]));
    }
    if let Some(datatype) = datatype {
        let datatype = match datatype.as_node().map(|node| &node.kind) {
            Some(NodeKind::Name { id }) => id.clone(),
            _ => context.render(&datatype)?,
        };
        arguments.push(Argument::Rendered(format!("dtype={datatype}")));
    }
    FunctionCall::new()
        .named(format!("{TORCH}full"))
        .render_with(node, context, &arguments)
}

fn indexed_address(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = parts(node)?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Fallback::unique_address(context.names())],
        Vec::new(),
    );
    let rendered = context.render_all(&arguments)?;
    let (address, indices) = rendered
        .split_first()
        .ok_or_else(|| MappingError::mismatch(node, "IndexedAddress"))?;
    let indices: Vec<String> = indices.iter().map(|index| format!("{{{index}}}")).collect();
    Ok(format!("f\"{{{address}}}[{}]\"", indices.join(",")))
}

fn iid(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let call = parts(node)?;
    let arguments = organize_arguments(
        call.args,
        call.keywords,
        vec![Argument::dirac().into(), Argument::int(1).into()],
        Vec::new(),
    );
    let distribution = context.render(&arguments[0])?;
    let size = context.render(&arguments[1])?;
    let size = if arguments[1].is_sequence() {
        size
    } else {
        tuple_of(&[size])
    };
    Ok(format!("{distribution}.expand({size})"))
}

/// Pyro's half distributions have no location; only a literal zero is dropped.
fn half_distribution(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let name = call_name(node)?.to_string();
    let mut arguments = canonical_arguments(parts(node)?, context.names());
    if arguments.len() >= 2 {
        if !arguments[0].as_node().is_some_and(is_zero) {
            return Err(MappingError::fatal(format!(
                "Pyro's `{name}` requires `loc` (the first argument) to be `0`"
            )));
        }
        arguments.remove(0);
    }
    FunctionCall::new()
        .named(format!("{DISTRIBUTION}{name}"))
        .render_with(node, context, &arguments)
}

fn is_zero(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Constant {
            value: Constant::Int(value),
        } => *value == 0,
        NodeKind::Constant {
            value: Constant::Float(value),
        } => *value == 0.0,
        _ => false,
    }
}

/// Renders every canonical argument as `torch.tensor(..)`.
fn tensors(node: &Node, context: &mut Context<'_>) -> Result<Vec<Argument<'static>>, MappingError> {
    import_torch(context);
    let arguments = canonical_arguments(parts(node)?, context.names());
    arguments
        .iter()
        .map(|argument| {
            let rendered = context.render(argument)?;
            Ok(Argument::Rendered(format!("{TORCH}tensor({rendered})")))
        })
        .collect()
}

fn dirac(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let arguments = tensors(node, context)?;
    FunctionCall::new()
        .named(format!("{DISTRIBUTION}Delta"))
        .render_with(node, context, &arguments)
}

fn tensor_arguments(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    let name = call_name(node)?.to_string();
    let arguments = tensors(node, context)?;
    FunctionCall::new()
        .named(format!("{DISTRIBUTION}{name}"))
        .render_with(node, context, &arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::builder::{call};

    fn translate(body: Vec<Node>) -> Option<String> {
        translator().translate(&module(vec![model("m", &[], body)]))
    }

    #[test]
    fn observations_become_conditioned_samples() {
        let observation = expression(call_with(
            name("observe"),
            vec![name("x")],
            vec![keyword("distribution", call("Normal", vec![int(0), int(1)]))],
        ));
        let translation = translate(vec![observation]).unwrap();
        assert!(translation.ends_with(
            "    pyro.sample('__context__unique_address_1', dist.Normal(0, 1), obs=x)"
        ));
    }

    #[test]
    fn torch_is_imported_once() {
        let vector = call_with(name("Vector"), vec![name("n")], vec![keyword("t", name("int"))]);
        let dirac = call("Dirac", vec![int(3)]);
        let translation = translate(vec![
            assign(name("v"), vector),
            assign(name("d"), call("sample", vec![string("d"), dirac])),
        ])
        .unwrap();
        assert_eq!(translation.matches("import torch").count(), 1);
        assert!(translation.contains("v = torch.full((n,), 0, dtype=int)"));
        assert!(translation.contains("pyro.sample('d', dist.Delta(torch.tensor(3)))"));
    }

    #[test]
    fn half_distributions_need_a_zero_location() {
        let zero = call("HalfNormal", vec![int(0), int(2)]);
        let translation = translate(vec![assign(name("s"), call("sample", vec![string("s"), zero]))]);
        assert!(translation.unwrap().contains("dist.HalfNormal(2)"));
        let shifted = call("HalfNormal", vec![int(1), int(2)]);
        let translation = translate(vec![assign(name("s"), call("sample", vec![string("s"), shifted]))]);
        assert!(translation.is_none());
    }

    #[test]
    fn factors_lead_with_the_address() {
        let factor = expression(call("factor", vec![name("e"), string("a")]));
        assert!(translate(vec![factor]).unwrap().contains("pyro.factor('a', e)"));
    }
}
