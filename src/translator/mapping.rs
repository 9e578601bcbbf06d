//! Mapping contract and the call-mapping builder.

// ============================================================================
// IMPORTS
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::arguments::{canonical_arguments, Argument};
use super::context::{Context, NameCounter};
use crate::ast::{CallParts, Node, NodeKind, NodeTag};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Text for expressions, `None` for statements (which emit lines instead).
pub type MappingResult = Result<Option<String>, MappingError>;

/// Renders one node kind.
pub type Mapping = fn(&Node, &mut Context<'_>) -> MappingResult;

pub type MappingTable = HashMap<NodeTag, Mapping>;

/// Renders calls to one function name.
pub type CallMapping =
    Arc<dyn Fn(&Node, &mut Context<'_>) -> Result<String, MappingError> + Send + Sync>;

pub type CallTable = HashMap<&'static str, CallMapping>;

/// Produces the arguments a call is rendered with.
pub type ArgumentProducer = for<'n> fn(CallParts<'n>, &NameCounter) -> Vec<Argument<'n>>;

/// Failure of a single mapping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// The run cannot produce a faithful translation.
    #[error("{message}")]
    Fatal { message: String },
    /// The node is rendered as `fallback` and the run continues.
    #[error("{message}")]
    Warning { message: String, fallback: String },
}

/// Builder for mappings that render a call as `name(arguments)`.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    name: Option<String>,
    arguments: ArgumentProducer,
    parentheses: (&'static str, &'static str),
    delimiter: &'static str,
    flat: bool,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl MappingError {
    pub fn fatal(message: impl Into<String>) -> Self {
        MappingError::Fatal {
            message: message.into(),
        }
    }

    /// A warning falling back to `node`'s unparse.
    pub fn warning(node: &Node, message: impl Into<String>) -> Self {
        MappingError::Warning {
            message: message.into(),
            fallback: node.unparse(),
        }
    }

    /// A mapping was handed a node shape it does not render.
    pub fn mismatch(node: &Node, mapping: &str) -> Self {
        Self::warning(
            node,
            format!("Mismatching node-type `{}` for `{mapping}`", node.tag()),
        )
    }

    pub fn message(&self) -> &str {
        match self {
            MappingError::Fatal { message } | MappingError::Warning { message, .. } => message,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, MappingError::Fatal { .. })
    }
}

impl Default for FunctionCall {
    fn default() -> Self {
        Self {
            name: None,
            arguments: canonical_arguments,
            parentheses: ("(", ")"),
            delimiter: ", ",
            flat: false,
        }
    }
}

impl FunctionCall {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders under a fixed name instead of the call's own.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn arguments(mut self, producer: ArgumentProducer) -> Self {
        self.arguments = producer;
        self
    }

    pub fn parentheses(mut self, open: &'static str, close: &'static str) -> Self {
        self.parentheses = (open, close);
        self
    }

    pub fn delimiter(mut self, delimiter: &'static str) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Refuses (with a warning) calls whose callee is not a bare name.
    pub fn flat(mut self) -> Self {
        self.flat = true;
        self
    }

    /// Renders `node` with the arguments of the configured producer.
    pub fn render(&self, node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
        let call = self.check(node)?;
        let arguments = (self.arguments)(call, context.names());
        self.render_with(node, context, &arguments)
    }

    /// Renders `node` with explicitly supplied arguments.
    pub fn render_with(
        &self,
        node: &Node,
        context: &mut Context<'_>,
        arguments: &[Argument<'_>],
    ) -> Result<String, MappingError> {
        self.check(node)?;
        let name = match &self.name {
            Some(name) => name.clone(),
            None => call_name(node)?.to_string(),
        };
        let rendered = context.render_all(arguments)?;
        let (open, close) = self.parentheses;
        Ok(format!("{name}{open}{}{close}", rendered.join(self.delimiter)))
    }

    pub fn build(self) -> CallMapping {
        Arc::new(move |node: &Node, context: &mut Context<'_>| {
            self.render(node, context)
        })
    }

    fn check<'n>(&self, node: &'n Node) -> Result<CallParts<'n>, MappingError> {
        let call = node
            .as_call()
            .ok_or_else(|| MappingError::mismatch(node, "FunctionCall"))?;
        if self.flat && !matches!(call.func.kind, NodeKind::Name { .. }) {
            return Err(MappingError::warning(
                node,
                format!("Expected a flat function call: {}", node.abbreviated(25)),
            ));
        }
        Ok(call)
    }
}

/// The name a call is known by, see [`Node::name`].
pub fn call_name(node: &Node) -> Result<&str, MappingError> {
    node.name().ok_or_else(|| {
        MappingError::warning(
            node,
            format!("Failed to retrieve name of node with type `{}`", node.tag()),
        )
    })
}

/// Renders a call under its own name with canonical arguments.
pub fn render_call(node: &Node, context: &mut Context<'_>) -> Result<String, MappingError> {
    FunctionCall::new().render(node, context)
}

/// A call mapping that always fails fatally, naming the called function.
pub fn unsupported(framework: &'static str) -> CallMapping {
    Arc::new(move |node: &Node, _: &mut Context<'_>| {
        let name = node.name().unwrap_or_default();
        Err(MappingError::fatal(format!(
            "{framework} doesn't provide an equivalent for `{name}`."
        )))
    })
}

/// Adapts a plain function into a [`CallMapping`].
pub fn call_mapping(
    mapping: fn(&Node, &mut Context<'_>) -> Result<String, MappingError>,
) -> CallMapping {
    Arc::new(mapping)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    fn render(mapping: &FunctionCall, node: &Node) -> Result<String, MappingError> {
        let table = MappingTable::new();
        let names = NameCounter::new();
        let mut context = Context::new(&table, &names);
        mapping.render(node, &mut context)
    }

    #[test]
    fn renders_with_custom_punctuation() {
        let node = call("f", vec![int(1), name("x")]);
        let mapping = FunctionCall::new()
            .named("g")
            .parentheses("[", "]")
            .delimiter("; ");
        assert_eq!(render(&mapping, &node).unwrap(), "g[1; x]");
        assert_eq!(render(&FunctionCall::new(), &node).unwrap(), "f(1, x)");
    }

    #[test]
    fn flat_calls_reject_attribute_callees() {
        let node = call_with(attribute(name("math"), "floor"), vec![float(1.5)], vec![]);
        let error = render(&FunctionCall::new().flat(), &node).unwrap_err();
        assert!(!error.is_fatal());
        assert!(error.message().starts_with("Expected a flat function call"));
        assert_eq!(render(&FunctionCall::new(), &node).unwrap(), "floor(1.5)");
    }

    #[test]
    fn keywords_follow_positionals() {
        let node = call_with(name("f"), vec![int(1)], vec![keyword("k", int(2))]);
        assert_eq!(render(&FunctionCall::new(), &node).unwrap(), "f(1, 2)");
    }
}
