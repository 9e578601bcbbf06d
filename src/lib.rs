//! PyThia: a linter and translator for a restricted dialect of Python used to
//! write probabilistic programs.
//!
//! Models arrive as syntax trees ([`ast::Node`]). The [`linter`] reports where a
//! model leaves the dialect; the [`translator`] renders conforming models for
//! Pyro, Turing or Gen.

pub use crate::diagnostics::{Diagnostic, DiagnosticReport, Severity};
pub use crate::errors::{ExitCode, PythiaError};
pub use crate::linter::{default_linter, validate, Linter};
pub use crate::translator::{Backend, MappingError, TranslationError, Translator};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod errors;
pub mod linter;
pub mod translator;
