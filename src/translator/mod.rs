//! Table-driven translation of PyThia models into framework code.
//!
//! A [`Translator`] walks the tree through a [`MappingTable`] keyed by node
//! kind. Each backend is such a table, assembled from a family's generic
//! mappings (Python or Julia) plus framework-specific call mappings.
//!
//! ```rust
//! use pythia::ast::builder::*;
//! use pythia::translator::Backend;
//!
//! let tree = module(vec![model("m", &[], vec![return_value(int(1))])]);
//! let translation = Backend::Turing.translator().translate(&tree).unwrap();
//! assert_eq!(translation, "using Turing\n@model function m()\n    return 1\nend");
//! ```

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod arguments;
pub mod context;
pub mod julia;
pub mod mapping;
pub mod python;

pub use arguments::{organize_arguments, Argument, Fallback, KeywordDefault};
pub use context::{Context, Line, NameCounter};
pub use mapping::{
    CallMapping, CallTable, FunctionCall, Mapping, MappingError, MappingResult, MappingTable,
};

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use clap::ValueEnum;
use thiserror::Error;
use tracing::{debug, error};

use crate::ast::Node;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Emits fixed text around the translated body.
pub type Amble = fn(&mut Context<'_>);

/// Decides whether a tree may be translated at all, giving reasons if not.
pub type Validation = Box<dyn Fn(&Node) -> Result<(), Vec<String>> + Send + Sync>;

/// Why a run produced no translation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslationError {
    #[error("The model was rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

/// A configured translation pipeline.
pub struct Translator {
    mappings: MappingTable,
    preamble: Option<Amble>,
    postamble: Option<Amble>,
    validation: Option<Validation>,
}

/// The frameworks PyThia translates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Pyro,
    Turing,
    Gen,
    GenChoicemap,
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Translator {
    pub fn new(mappings: MappingTable) -> Self {
        Self {
            mappings,
            preamble: None,
            postamble: None,
            validation: None,
        }
    }

    pub fn with_preamble(mut self, preamble: Amble) -> Self {
        self.preamble = Some(preamble);
        self
    }

    pub fn with_postamble(mut self, postamble: Amble) -> Self {
        self.postamble = Some(postamble);
        self
    }

    /// Refuses to translate trees the validation rejects.
    pub fn with_validation(
        mut self,
        validation: impl Fn(&Node) -> Result<(), Vec<String>> + Send + Sync + 'static,
    ) -> Self {
        self.validation = Some(Box::new(validation));
        self
    }

    /// Translates `tree`, logging and discarding the reason on failure.
    pub fn translate(&self, tree: &Node) -> Option<String> {
        match self.try_translate(tree) {
            Ok(translation) => Some(translation),
            Err(TranslationError::Rejected(reasons)) => {
                for reason in &reasons {
                    error!("{reason}");
                }
                error!("Translation aborted: the model failed validation.");
                None
            }
            Err(TranslationError::Mapping(mapping)) => {
                error!("Translation failed: {}", mapping.message());
                None
            }
        }
    }

    /// Runs validation, preamble, the body and postamble, then consolidates.
    pub fn try_translate(&self, tree: &Node) -> Result<String, TranslationError> {
        if let Some(validation) = &self.validation {
            validation(tree).map_err(TranslationError::Rejected)?;
        }
        let names = NameCounter::new();
        let mut context = Context::new(&self.mappings, &names);
        if let Some(preamble) = self.preamble {
            context.in_preamble(false, preamble);
        }
        debug!("Translating {}.", tree.abbreviated(40));
        // A bare expression at the root still yields a line.
        if let Some(text) = context.visit(tree)? {
            context.line(text);
        }
        if let Some(postamble) = self.postamble {
            context.in_postamble(false, postamble);
        }
        Ok(context.consolidated())
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("mappings", &self.mappings.len())
            .field("validated", &self.validation.is_some())
            .finish()
    }
}

impl Backend {
    /// A fresh translator for this framework, without validation.
    pub fn translator(self) -> Translator {
        match self {
            Backend::Pyro => python::pyro::translator(),
            Backend::Turing => julia::turing::translator(),
            Backend::Gen => julia::gen::translator(),
            Backend::GenChoicemap => julia::gen::choicemap_translator(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Backend::Pyro => "pyro",
            Backend::Turing => "turing",
            Backend::Gen => "gen",
            Backend::GenChoicemap => "gen-choicemap",
        };
        f.write_str(name)
    }
}

// ============================================================================
// TESTS
// ============================================================================
