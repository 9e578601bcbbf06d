//! Structural recognizers shared by the rules.
//!
//! Addresses and distributions are recognized by shape, not by type: nothing
//! here resolves where a called name actually comes from.

use crate::ast::{Constant, Node, NodeKind};

/// Constructor of multi-dimensional addresses.
pub const INDEXED_ADDRESS: &str = "IndexedAddress";

/// Distribution constructors of the dialect.
pub const DISTRIBUTIONS: &[&str] = &[
    "Dirac",
    "Beta",
    "Cauchy",
    "Exponential",
    "Gamma",
    "HalfCauchy",
    "HalfNormal",
    "InverseGamma",
    "Normal",
    "StudentT",
    "Uniform",
    "Bernoulli",
    "Binomial",
    "Categorical",
    "DiscreteUniform",
    "Geometric",
    "HyperGeometric",
    "Poisson",
    "Dirichlet",
    "MultivariateNormal",
];

/// Wraps a base distribution into `n` independent copies.
pub const IID: &str = "IID";

/// Whether `node` calls `function`, either directly or through an attribute.
///
/// ```rust
/// use pythia::ast::builder::*;
/// use pythia::linter::rules::patterns::is_function_called;
/// let node = call_with(attribute(name("pythia"), "observe"), vec![int(1)], vec![]);
/// assert!(is_function_called(&node, "observe"));
/// assert!(!is_function_called(&node, "pythia"));
/// ```
pub fn is_function_called(node: &Node, function: &str) -> bool {
    let Some(call) = node.as_call() else {
        return false;
    };
    match &call.func.kind {
        NodeKind::Name { id } => id == function,
        NodeKind::Attribute { attr, .. } => attr == function,
        _ => false,
    }
}

/// A string literal or a call to [`INDEXED_ADDRESS`].
pub fn is_address(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Constant {
            value: Constant::Str(_)
        }
    ) || is_function_called(node, INDEXED_ADDRESS)
}

/// A call to one of the [`DISTRIBUTIONS`], or a wrapping of one.
pub fn is_distribution(node: &Node) -> bool {
    is_base_distribution(node) || is_wrapped_distribution(node)
}

fn is_base_distribution(node: &Node) -> bool {
    DISTRIBUTIONS
        .iter()
        .any(|distribution| is_function_called(node, distribution))
}

fn is_wrapped_distribution(node: &Node) -> bool {
    if !is_function_called(node, IID) {
        return false;
    }
    match node.as_call() {
        Some(call) => {
            call.keywords.is_empty() && call.args.len() == 2 && is_base_distribution(&call.args[0])
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    #[test]
    fn addresses_are_strings_or_indexed() {
        assert!(is_address(&string("mu")));
        assert!(is_address(&call(INDEXED_ADDRESS, vec![string("mu"), name("i")])));
        assert!(!is_address(&name("mu")));
        assert!(!is_address(&int(3)));
    }

    #[test]
    fn wrapped_distributions_need_a_base_and_a_size() {
        let normal = call("Normal", vec![int(0), int(1)]);
        assert!(is_distribution(&normal));
        assert!(is_distribution(&call(IID, vec![normal.clone(), int(3)])));
        assert!(!is_distribution(&call(IID, vec![normal.clone()])));
        assert!(!is_distribution(&call(IID, vec![name("d"), int(3)])));
        assert!(!is_distribution(&call("Pareto", vec![int(1)])));
    }
}
