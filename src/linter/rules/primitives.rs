//! Call-shape rules for the dialect's primitives.
//!
//! Each rule only looks at calls to its own primitive and accepts exactly the
//! argument arrangements documented in its usage message.

use super::patterns::{is_address, is_distribution, is_function_called, INDEXED_ADDRESS};
use super::Rule;
use crate::ast::{CallParts, Keyword, Node};

pub const SAMPLE_USAGE: Rule = Rule::error(
    "sample-usage",
    "Usage: `sample(<str | IndexedAddress(...)>, <distribution>)`",
    sample,
);

pub const OBSERVE_USAGE: Rule = Rule::error(
    "observe-usage",
    "Usage: `observe(<data>[, [address=]<str | IndexedAddress(...)>[, [distribution=]<distribution>]])`",
    observe,
);

pub const FACTOR_USAGE: Rule = Rule::error(
    "factor-usage",
    "Usage: `factor(<expression>[, [address=]<str | IndexedAddress(...)>])`",
    factor,
);

pub const INDEXED_ADDRESS_USAGE: Rule = Rule::error(
    "indexed-address-usage",
    "Usage: `IndexedAddress(<address>, <index>, …)`",
    indexed_address,
);

pub const VECTOR_USAGE: Rule = Rule::error(
    "vector-usage",
    "Usage: `Vector(<size>[, fill=<value>][, t=<type>])`",
    vector,
);

pub const ARRAY_USAGE: Rule = Rule::error(
    "array-usage",
    "Usage: `Array(<shape>[, fill=<value>][, t=<type>])`",
    array,
);

pub const RULES: &[Rule] = &[
    SAMPLE_USAGE,
    OBSERVE_USAGE,
    FACTOR_USAGE,
    INDEXED_ADDRESS_USAGE,
    VECTOR_USAGE,
    ARRAY_USAGE,
];

// ============================================================================
// MATCHERS
// ============================================================================

/// Runs `valid` on calls to `function`, flagging the call when it fails.
fn check_call<'n>(
    node: &'n Node,
    function: &str,
    valid: impl FnOnce(CallParts<'n>) -> bool,
) -> Option<&'n Node> {
    if !is_function_called(node, function) {
        return None;
    }
    match node.as_call() {
        Some(call) if valid(call) => None,
        _ => Some(node),
    }
}

/// Named keyword values, or `None` when a keyword is not `allowed`, repeated
/// or an unpacking.
fn only_keywords<'n>(keywords: &'n [Keyword], allowed: &[&str]) -> Option<Vec<(&'n str, &'n Node)>> {
    let mut seen: Vec<(&str, &Node)> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let name = keyword.arg.as_deref()?;
        if !allowed.contains(&name) || seen.iter().any(|(existing, _)| *existing == name) {
            return None;
        }
        seen.push((name, &keyword.value));
    }
    Some(seen)
}

fn lookup<'n>(keywords: &[(&str, &'n Node)], name: &str) -> Option<&'n Node> {
    keywords
        .iter()
        .find(|(keyword, _)| *keyword == name)
        .map(|(_, value)| *value)
}

/// Fills a slot given either positionally or by keyword; `None` when both.
fn slot<'n>(positional: Option<&'n Node>, keyword: Option<&'n Node>) -> Option<Option<&'n Node>> {
    match (positional, keyword) {
        (Some(_), Some(_)) => None,
        (positional, keyword) => Some(positional.or(keyword)),
    }
}

fn sample(node: &Node) -> Option<&Node> {
    check_call(node, "sample", |call| match call.args {
        [address, distribution] => {
            call.keywords.is_empty() && is_address(address) && is_distribution(distribution)
        }
        _ => false,
    })
}

fn observe(node: &Node) -> Option<&Node> {
    check_call(node, "observe", |call| {
        if call.args.is_empty() || call.args.len() > 3 {
            return false;
        }
        let Some(keywords) = only_keywords(call.keywords, &["address", "distribution"]) else {
            return false;
        };
        let address = slot(call.args.get(1), lookup(&keywords, "address"));
        let distribution = slot(call.args.get(2), lookup(&keywords, "distribution"));
        match (address, distribution) {
            (Some(address), Some(distribution)) => {
                address.map_or(true, is_address) && distribution.map_or(true, is_distribution)
            }
            _ => false,
        }
    })
}

fn factor(node: &Node) -> Option<&Node> {
    check_call(node, "factor", |call| {
        if call.args.is_empty() || call.args.len() > 2 {
            return false;
        }
        let Some(keywords) = only_keywords(call.keywords, &["address"]) else {
            return false;
        };
        match slot(call.args.get(1), lookup(&keywords, "address")) {
            Some(address) => address.map_or(true, is_address),
            None => false,
        }
    })
}

fn indexed_address(node: &Node) -> Option<&Node> {
    check_call(node, INDEXED_ADDRESS, |call| match call.args {
        [address, _, ..] => call.keywords.is_empty() && is_address(address),
        _ => false,
    })
}

fn constructor(call: CallParts<'_>) -> bool {
    call.args.len() == 1 && only_keywords(call.keywords, &["fill", "t"]).is_some()
}

fn vector(node: &Node) -> Option<&Node> {
    check_call(node, "Vector", constructor)
}

fn array(node: &Node) -> Option<&Node> {
    check_call(node, "Array", constructor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    fn data() -> Node {
        subscript(name("data"), name("i"))
    }

    fn address() -> Node {
        call(INDEXED_ADDRESS, vec![string("data"), name("i")])
    }

    fn poisson() -> Node {
        call("Poisson", vec![float(0.2)])
    }

    #[test]
    fn observe_accepts_mixed_styles() {
        let accepted = [
            call("observe", vec![data()]),
            call("observe", vec![data(), address()]),
            call("observe", vec![data(), address(), poisson()]),
            call_with(
                name("observe"),
                vec![data()],
                vec![keyword("distribution", poisson()), keyword("address", address())],
            ),
            call_with(
                name("observe"),
                vec![data(), address()],
                vec![keyword("distribution", poisson())],
            ),
            call_with(name("observe"), vec![data()], vec![keyword("distribution", poisson())]),
        ];
        for node in &accepted {
            assert!(OBSERVE_USAGE.check(node).is_none(), "{node}");
        }
    }

    #[test]
    fn observe_rejects_malformed_calls() {
        let rejected = [
            call("observe", vec![]),
            call("observe", vec![data(), name("address")]),
            call("observe", vec![data(), address(), name("d")]),
            call_with(
                name("observe"),
                vec![data(), address()],
                vec![keyword("address", address())],
            ),
            call_with(name("observe"), vec![data()], vec![keyword("value", int(1))]),
            call_with(
                name("observe"),
                vec![],
                vec![keyword("distribution", poisson()), keyword("address", address())],
            ),
        ];
        for node in &rejected {
            assert!(OBSERVE_USAGE.check(node).is_some(), "{node}");
        }
    }

    #[test]
    fn factor_takes_an_optional_address() {
        let keyword_address =
            call_with(name("factor"), vec![float(0.001)], vec![keyword("address", string("data"))]);
        assert!(FACTOR_USAGE.check(&keyword_address).is_none());
        assert!(FACTOR_USAGE.check(&call("factor", vec![float(0.001), address()])).is_none());
        assert!(FACTOR_USAGE.check(&call("factor", vec![])).is_some());
        let additional = call("factor", vec![float(0.1), string("a"), poisson()]);
        assert!(FACTOR_USAGE.check(&additional).is_some());
    }

    #[test]
    fn indexed_addresses_need_an_index() {
        assert!(INDEXED_ADDRESS_USAGE.check(&address()).is_none());
        let unindexed = call(INDEXED_ADDRESS, vec![string("data")]);
        assert!(INDEXED_ADDRESS_USAGE.check(&unindexed).is_some());
        let nested = call(INDEXED_ADDRESS, vec![address(), name("j")]);
        assert!(INDEXED_ADDRESS_USAGE.check(&nested).is_none());
    }

    #[test]
    fn constructors_take_one_size() {
        let filled = call_with(
            name("Vector"),
            vec![int(12)],
            vec![keyword("fill", int(-1)), keyword("t", name("int"))],
        );
        assert!(VECTOR_USAGE.check(&filled).is_none());
        assert!(VECTOR_USAGE.check(&call("Vector", vec![])).is_some());
        let shape = tuple(vec![int(256), int(256), int(3)]);
        assert!(ARRAY_USAGE.check(&call("Array", vec![shape.clone()])).is_none());
        assert!(ARRAY_USAGE.check(&call("Array", vec![shape, int(-1)])).is_some());
    }
}
