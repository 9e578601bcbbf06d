//! Output construction for one translation run.
//!
//! A [`Context`] collects indented body lines plus independent preamble and
//! postamble blocks, and dispatches nodes to the mapping table. Nested
//! contexts opened for the preamble or postamble share the run's mapping table
//! and [`NameCounter`], so unique names never repeat within a run.

// ============================================================================
// IMPORTS
// ============================================================================

use std::cell::Cell;
use std::fmt;

use tracing::{debug, warn};

use super::arguments::Argument;
use super::mapping::{MappingError, MappingResult, MappingTable};
use crate::ast::Node;

const SHIFTWIDTH: &str = "    ";

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// One body line and the indentation level it was emitted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub indentation: usize,
    pub contents: String,
}

/// Allocator of names that are unique within one translation run.
#[derive(Debug, Default)]
pub struct NameCounter(Cell<usize>);

/// The translator's output-construction state.
pub struct Context<'run> {
    mappings: &'run MappingTable,
    names: &'run NameCounter,
    indentation: usize,
    lines: Vec<Line>,
    preamble: Vec<String>,
    postamble: Vec<String>,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.indentation {
            f.write_str(SHIFTWIDTH)?;
        }
        f.write_str(&self.contents)
    }
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the counter, returning the new value (the first is 1).
    pub fn next(&self) -> usize {
        let next = self.0.get() + 1;
        self.0.set(next);
        next
    }

    /// A fresh name such as `__context__unique_address_1`.
    pub fn unique_name(&self) -> String {
        format!("__context__unique_address_{}", self.next())
    }
}

impl<'run> Context<'run> {
    pub fn new(mappings: &'run MappingTable, names: &'run NameCounter) -> Self {
        Self {
            mappings,
            names,
            indentation: 0,
            lines: Vec::new(),
            preamble: Vec::new(),
            postamble: Vec::new(),
        }
    }

    /// Appends a line at the current indentation.
    pub fn line(&mut self, contents: impl Into<String>) {
        self.lines.push(Line {
            indentation: self.indentation,
            contents: contents.into(),
        });
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Runs `scope` one level deeper; the level is restored on every return.
    pub fn indented<T>(&mut self, scope: impl FnOnce(&mut Self) -> T) -> T {
        self.indentation += 1;
        let result = scope(self);
        self.indentation -= 1;
        result
    }

    /// Visits `statements` one level deeper.
    pub fn block(&mut self, statements: &[Node]) -> Result<(), MappingError> {
        self.indented(|context| {
            for statement in statements {
                context.visit(statement)?;
            }
            Ok(())
        })
    }

    /// Captures whatever `scope` emits as a single preamble block.
    ///
    /// Empty blocks are dropped; with `discard_if_present`, so are blocks
    /// identical to one already present.
    pub fn in_preamble<T>(
        &mut self,
        discard_if_present: bool,
        scope: impl FnOnce(&mut Context<'run>) -> T,
    ) -> T {
        let (block, result) = self.nested(scope);
        push_block(&mut self.preamble, block, discard_if_present);
        result
    }

    /// Captures whatever `scope` emits as a single postamble block.
    pub fn in_postamble<T>(
        &mut self,
        discard_if_present: bool,
        scope: impl FnOnce(&mut Context<'run>) -> T,
    ) -> T {
        let (block, result) = self.nested(scope);
        push_block(&mut self.postamble, block, discard_if_present);
        result
    }

    pub fn unique_name(&self) -> String {
        self.names.unique_name()
    }

    pub fn names(&self) -> &'run NameCounter {
        self.names
    }

    /// Dispatches `node` to its mapping.
    ///
    /// Unmapped statements are emitted unparsed, unmapped expressions render
    /// unparsed. A mapping warning discards whatever the mapping emitted and
    /// substitutes the fallback, including any preamble or postamble blocks it
    /// added; fatal errors propagate.
    pub fn visit(&mut self, node: &Node) -> MappingResult {
        let tag = node.tag();
        let Some(mapping) = self.mappings.get(&tag).copied() else {
            debug!("No mapping found for node: {}.", node.abbreviated(40));
            return Ok(self.substitute(node, node.unparse()));
        };
        debug!("Mapping found for node: {}.", node.abbreviated(40));
        let marks = (self.lines.len(), self.preamble.len(), self.postamble.len());
        match mapping(node, self) {
            Err(MappingError::Warning { message, fallback }) => {
                warn!("Mapping failed for node-type `{tag}`: {message}.");
                self.lines.truncate(marks.0);
                self.preamble.truncate(marks.1);
                self.postamble.truncate(marks.2);
                Ok(self.substitute(node, fallback))
            }
            result => result,
        }
    }

    /// Visits an expression, always yielding text.
    pub fn expression(&mut self, node: &Node) -> Result<String, MappingError> {
        Ok(self.visit(node)?.unwrap_or_default())
    }

    /// Renders a canonicalized argument.
    pub fn render(&mut self, argument: &Argument<'_>) -> Result<String, MappingError> {
        match argument.to_node() {
            Some(node) => self.expression(&node),
            None => match argument {
                Argument::Rendered(text) => Ok(text.clone()),
                _ => Ok(String::new()),
            },
        }
    }

    pub fn render_all(&mut self, arguments: &[Argument<'_>]) -> Result<Vec<String>, MappingError> {
        arguments.iter().map(|argument| self.render(argument)).collect()
    }

    /// Preamble blocks, body lines, then postamble blocks, newline-joined.
    pub fn consolidated(&self) -> String {
        let body = self.lines.iter().map(ToString::to_string);
        self.preamble
            .iter()
            .cloned()
            .chain(body)
            .chain(self.postamble.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// INTERNAL HELPERS
// ============================================================================

impl<'run> Context<'run> {
    fn nested<T>(&mut self, scope: impl FnOnce(&mut Context<'run>) -> T) -> (String, T) {
        let mut nested = Context::new(self.mappings, self.names);
        let result = scope(&mut nested);
        (nested.consolidated(), result)
    }

    /// Places text standing in for `node`: as lines for statements, as the
    /// value for expressions.
    fn substitute(&mut self, node: &Node, text: String) -> Option<String> {
        if node.is_statement() {
            for line in text.lines() {
                self.line(line);
            }
            None
        } else {
            Some(text)
        }
    }
}

fn push_block(blocks: &mut Vec<String>, block: String, discard_if_present: bool) {
    if block.is_empty() || (discard_if_present && blocks.contains(&block)) {
        return;
    }
    blocks.push(block);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::*;
    use crate::ast::NodeTag;

    #[test]
    fn indentation_is_restored_after_errors() {
        let table = MappingTable::new();
        let names = NameCounter::new();
        let mut context = Context::new(&table, &names);
        context.line("a");
        let failed: Result<(), MappingError> = context.indented(|context| {
            context.line("b");
            Err(MappingError::fatal("stop"))
        });
        assert!(failed.is_err());
        context.line("c");
        assert_eq!(context.consolidated(), "a\n    b\nc");
    }

    #[test]
    fn duplicate_preamble_blocks_are_discarded_on_request() {
        let table = MappingTable::new();
        let names = NameCounter::new();
        let mut context = Context::new(&table, &names);
        for _ in 0..3 {
            context.in_preamble(true, |preamble| preamble.line("import torch"));
        }
        context.in_preamble(false, |_| ());
        context.in_postamble(false, |postamble| postamble.line("end"));
        context.in_postamble(false, |postamble| postamble.line("end"));
        context.line("body");
        assert_eq!(context.consolidated(), "import torch\nbody\nend\nend");
    }

    fn import_then_give_up(node: &Node, context: &mut Context<'_>) -> MappingResult {
        context.in_preamble(true, |preamble| preamble.line("import torch"));
        context.in_postamble(false, |postamble| postamble.line("cleanup()"));
        context.line("half = torch.full(");
        Err(MappingError::warning(node, "unexpected shape"))
    }

    #[test]
    fn failed_mappings_leave_no_blocks_behind() {
        let mut table = MappingTable::new();
        table.insert(NodeTag::Call, import_then_give_up);
        let names = NameCounter::new();
        let mut context = Context::new(&table, &names);
        context.in_preamble(true, |preamble| preamble.line("import pyro"));
        let rendered = context.visit(&call("Vector", vec![name("n")])).unwrap();
        assert_eq!(rendered.as_deref(), Some("Vector(n)"));
        assert_eq!(context.consolidated(), "import pyro");
    }

    #[test]
    fn nested_contexts_share_the_counter() {
        let table = MappingTable::new();
        let names = NameCounter::new();
        let mut context = Context::new(&table, &names);
        assert_eq!(context.unique_name(), "__context__unique_address_1");
        let inner = context.in_preamble(false, |preamble| preamble.unique_name());
        assert_eq!(inner, "__context__unique_address_2");
        assert_eq!(context.unique_name(), "__context__unique_address_3");
    }
}
