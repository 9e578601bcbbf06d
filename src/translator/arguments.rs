//! Canonicalization of call arguments.
//!
//! Target frameworks are called strictly positionally, so every backend call
//! mapping first reconciles positional and keyword arguments into one ordered
//! list. Defaults are either ready values or thunks, the latter only forced
//! when the default is actually used.

use std::borrow::Cow;

use super::context::NameCounter;
use crate::ast::{CallParts, Constant, Keyword, Node, NodeKind};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// One canonicalized argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<'n> {
    /// An argument taken from the original call.
    Node(&'n Node),
    /// A synthesized literal.
    Literal(Constant),
    /// A synthesized call to a bare function name.
    Call {
        function: &'static str,
        arguments: Vec<Argument<'n>>,
    },
    /// Text already rendered in the target language.
    Rendered(String),
}

/// A default that is either ready or computed on first use.
pub enum Fallback<'n, 'f> {
    Value(Argument<'n>),
    Lazy(Box<dyn FnOnce() -> Argument<'n> + 'f>),
}

/// A keyword default, positioned or merely ordered.
pub enum KeywordDefault<'n, 'f> {
    /// Appended when exactly `position - 1` arguments precede it (1-based).
    At {
        position: usize,
        name: &'static str,
        default: Fallback<'n, 'f>,
    },
    /// Appended in declaration order, but only when supplied.
    Named(&'static str),
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl<'n> Argument<'n> {
    pub fn int(value: i64) -> Self {
        Argument::Literal(Constant::Int(value))
    }

    /// The `Dirac(True)` placeholder distribution.
    pub fn dirac() -> Self {
        Argument::Call {
            function: "Dirac",
            arguments: vec![Argument::Literal(Constant::Bool(true))],
        }
    }

    /// The argument as a tree node, synthesizing one if needed.
    ///
    /// Rendered text has no tree form.
    pub fn to_node(&self) -> Option<Cow<'n, Node>> {
        match self {
            Argument::Node(node) => Some(Cow::Borrowed(*node)),
            Argument::Literal(value) => Some(Cow::Owned(Node::new(NodeKind::Constant {
                value: value.clone(),
            }))),
            Argument::Call {
                function,
                arguments,
            } => {
                let args = arguments
                    .iter()
                    .map(|argument| argument.to_node().map(Cow::into_owned))
                    .collect::<Option<Vec<_>>>()?;
                Some(Cow::Owned(Node::new(NodeKind::Call {
                    func: Box::new(Node::new(NodeKind::Name {
                        id: function.to_string(),
                    })),
                    args,
                    keywords: Vec::new(),
                })))
            }
            Argument::Rendered(_) => None,
        }
    }

    /// Whether the argument is a list or tuple display.
    pub fn is_sequence(&self) -> bool {
        match self {
            Argument::Node(node) => node.is_sequence(),
            _ => false,
        }
    }

    pub fn as_node(&self) -> Option<&'n Node> {
        match self {
            Argument::Node(node) => Some(*node),
            _ => None,
        }
    }
}

impl<'n, 'f> Fallback<'n, 'f> {
    pub fn lazy(thunk: impl FnOnce() -> Argument<'n> + 'f) -> Self {
        Fallback::Lazy(Box::new(thunk))
    }

    /// A fresh string address, drawn from `names` only when needed.
    pub fn unique_address(names: &'f NameCounter) -> Self {
        Fallback::lazy(move || Argument::Literal(Constant::Str(names.unique_name())))
    }

    pub fn force(self) -> Argument<'n> {
        match self {
            Fallback::Value(argument) => argument,
            Fallback::Lazy(thunk) => thunk(),
        }
    }
}

impl<'n> From<Argument<'n>> for Fallback<'n, '_> {
    fn from(argument: Argument<'n>) -> Self {
        Fallback::Value(argument)
    }
}

impl<'n, 'f> KeywordDefault<'n, 'f> {
    pub fn at(position: usize, name: &'static str, default: impl Into<Fallback<'n, 'f>>) -> Self {
        KeywordDefault::At {
            position,
            name,
            default: default.into(),
        }
    }
}

/// Orders a call's arguments into one positional list.
///
/// Positional arguments are padded with the `defaults` they lack. Positioned
/// keyword defaults are then visited by ascending position, and each one whose
/// position directly follows the arguments collected so far contributes the
/// matching keyword argument or else its default. Named defaults contribute
/// their keyword argument when supplied. Remaining keyword arguments follow in
/// their original order.
///
/// ```rust
/// use pythia::ast::builder::*;
/// use pythia::translator::arguments::{organize_arguments, Argument, KeywordDefault};
///
/// let keywords = vec![keyword("fill", int(9))];
/// let organized = organize_arguments(
///     &[],
///     &keywords,
///     vec![Argument::int(1).into()],
///     vec![KeywordDefault::at(2, "fill", Argument::int(0))],
/// );
/// assert_eq!(organized, vec![Argument::int(1), Argument::Node(&keywords[0].value)]);
/// ```
pub fn organize_arguments<'n>(
    args: &'n [Node],
    keywords: &'n [Keyword],
    defaults: Vec<Fallback<'n, '_>>,
    keyword_defaults: Vec<KeywordDefault<'n, '_>>,
) -> Vec<Argument<'n>> {
    let mut organized: Vec<Argument<'n>> = args.iter().map(Argument::Node).collect();
    let supplied = organized.len();
    organized.extend(defaults.into_iter().skip(supplied).map(Fallback::force));

    let mut remaining: Vec<(Option<&str>, &'n Node)> = keywords
        .iter()
        .map(|keyword| (keyword.arg.as_deref(), &keyword.value))
        .collect();
    let mut take = |name: &str| -> Option<&'n Node> {
        let index = remaining
            .iter()
            .position(|(keyword, _)| *keyword == Some(name))?;
        Some(remaining.remove(index).1)
    };

    let (mut positioned, named): (Vec<_>, Vec<_>) = keyword_defaults
        .into_iter()
        .partition(|default| matches!(default, KeywordDefault::At { .. }));
    positioned.sort_by_key(|default| match default {
        KeywordDefault::At { position, .. } => *position,
        KeywordDefault::Named(_) => 0,
    });

    for default in positioned {
        let KeywordDefault::At {
            position,
            name,
            default,
        } = default
        else {
            continue;
        };
        if organized.len() + 1 != position {
            continue;
        }
        organized.push(match take(name) {
            Some(value) => Argument::Node(value),
            None => default.force(),
        });
    }
    for default in named {
        if let KeywordDefault::Named(name) = default {
            if let Some(value) = take(name) {
                organized.push(Argument::Node(value));
            }
        }
    }
    organized.extend(remaining.into_iter().map(|(_, value)| Argument::Node(value)));
    organized
}

/// The call's arguments in their canonical order, without defaults.
pub fn canonical_arguments<'n>(call: CallParts<'n>, _: &NameCounter) -> Vec<Argument<'n>> {
    organize_arguments(call.args, call.keywords, Vec::new(), Vec::new())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;

    fn organized<'n>(args: &'n [Node], keywords: &'n [Keyword]) -> Vec<Argument<'n>> {
        organize_arguments(
            args,
            keywords,
            vec![Argument::int(1).into(), Argument::int(0).into()],
            vec![
                KeywordDefault::at(3, "c", Argument::int(12)),
                KeywordDefault::Named("d"),
            ],
        )
    }

    #[test]
    fn positional_defaults_pad_missing_arguments() {
        let args = vec![string("some")];
        let result = organized(&args, &[]);
        assert_eq!(
            result,
            vec![Argument::Node(&args[0]), Argument::int(0), Argument::int(12)]
        );
    }

    #[test]
    fn keywords_fill_their_position() {
        let args = vec![int(1), int(9)];
        let keywords = vec![keyword("d", none()), keyword("c", int(3))];
        let result = organized(&args, &keywords);
        assert_eq!(
            result,
            vec![
                Argument::Node(&args[0]),
                Argument::Node(&args[1]),
                Argument::Node(&keywords[1].value),
                Argument::Node(&keywords[0].value),
            ]
        );
    }

    #[test]
    fn fill_keyword_follows_a_single_default() {
        let fill = |args: &[Node], keywords: &[Keyword]| -> Vec<String> {
            organize_arguments(
                args,
                keywords,
                vec![Argument::int(1).into()],
                vec![KeywordDefault::at(2, "fill", Argument::int(0))],
            )
            .iter()
            .filter_map(Argument::to_node)
            .map(|node| node.unparse())
            .collect()
        };
        assert_eq!(fill(&[], &[]), vec!["1", "0"]);
        assert_eq!(fill(&[], &[keyword("fill", int(9))]), vec!["1", "9"]);
        assert_eq!(fill(&[int(5)], &[]), vec!["5", "0"]);
    }

    #[test]
    fn misplaced_keywords_trail_in_original_order() {
        // Three positionals leave no room for `c` at position three.
        let args = vec![int(5), int(0), int(7)];
        let keywords = vec![keyword("x", int(1)), keyword("c", int(2))];
        let result = organized(&args, &keywords);
        assert_eq!(result.len(), 5);
        assert_eq!(result[3], Argument::Node(&keywords[0].value));
        assert_eq!(result[4], Argument::Node(&keywords[1].value));
    }

    #[test]
    fn lazy_defaults_are_only_forced_when_used() {
        let names = NameCounter::new();
        let args = vec![int(1)];
        let keywords = vec![keyword("address", string("a"))];
        organize_arguments(
            &args,
            &keywords,
            vec![],
            vec![KeywordDefault::at(2, "address", Fallback::unique_address(&names))],
        );
        assert_eq!(names.unique_name(), "__context__unique_address_1");

        let result = organize_arguments(
            &args,
            &[],
            vec![],
            vec![KeywordDefault::at(2, "address", Fallback::unique_address(&names))],
        );
        assert_eq!(
            result[1],
            Argument::Literal(Constant::Str("__context__unique_address_2".to_string()))
        );
    }

    #[test]
    fn synthesized_calls_become_nodes() {
        let node = Argument::dirac().to_node().unwrap();
        assert_eq!(node.unparse(), "Dirac(True)");
        assert!(Argument::Rendered("x".to_string()).to_node().is_none());
    }
}
