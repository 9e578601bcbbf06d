//! Errors at the program boundary and the exit codes they map to.
//!
//! Library failures (diagnostics, mapping errors) are values the caller
//! inspects; [`PythiaError`] is what the command line reports through miette.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::translator::{Backend, MappingError};

/// Process exit codes of the `pythia` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    ReadError = 11,
    ParseError = 12,
    ValidationError = 13,
    WriteError = 14,
    TranslationError = 20,
}

#[derive(Debug, Error, Diagnostic)]
pub enum PythiaError {
    #[error("Could not read {}", path.display())]
    #[diagnostic(code(pythia::read), help("Check that the file exists and is readable."))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed syntax tree: {message}")]
    #[diagnostic(
        code(pythia::parse),
        help("The input must be a module serialized as JSON by the PyThia parser.")
    )]
    Parse {
        message: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("The model failed validation:\n{}", reasons.join("\n"))]
    #[diagnostic(
        code(pythia::validation),
        help("Run `pythia lint` for details, or pass `--force` to translate anyway.")
    )]
    Validation { reasons: Vec<String> },

    #[error("Refusing to overwrite {}", path.display())]
    #[diagnostic(
        code(pythia::write),
        help("Use `--output-overwrite` or `--output-append` to write to an existing file.")
    )]
    OutputExists { path: PathBuf },

    #[error("Could not write {}", path.display())]
    #[diagnostic(code(pythia::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not write the report")]
    #[diagnostic(code(pythia::output))]
    Report(#[from] serde_json::Error),

    #[error("Translation to {backend} failed: {}", source.message())]
    #[diagnostic(
        code(pythia::translation),
        help("The construct has no equivalent in the target framework.")
    )]
    Translation {
        backend: Backend,
        source: MappingError,
    },
}

impl PythiaError {
    /// Wraps a JSON error, pointing at the offending position of `input`.
    pub fn parse(name: &str, input: &str, error: &serde_json::Error) -> Self {
        let offset = offset_of(input, error.line(), error.column());
        PythiaError::Parse {
            message: error.to_string(),
            src: Arc::new(NamedSource::new(name, input.to_string())),
            span: SourceSpan::from((offset, 0)),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            PythiaError::Read { .. } => ExitCode::ReadError,
            PythiaError::Parse { .. } => ExitCode::ParseError,
            PythiaError::Validation { .. } => ExitCode::ValidationError,
            PythiaError::OutputExists { .. }
            | PythiaError::Write { .. }
            | PythiaError::Report(_) => ExitCode::WriteError,
            PythiaError::Translation { .. } => ExitCode::TranslationError,
        }
    }
}

/// Byte offset of a 1-based line and column, clamped to the input.
fn offset_of(input: &str, line: usize, column: usize) -> usize {
    let line_start: usize = input
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_point_into_the_input() {
        let input = "{\n  \"kind\": }";
        let error = serde_json::from_str::<serde_json::Value>(input).unwrap_err();
        let error = PythiaError::parse("model.json", input, &error);
        let PythiaError::Parse { span, .. } = &error else {
            panic!("expected a parse error");
        };
        assert!((2..=input.len()).contains(&span.offset()));
        assert_eq!(error.exit_code(), ExitCode::ParseError);
        assert_eq!(
            error.code().map(|code| code.to_string()).as_deref(),
            Some("pythia::parse")
        );
    }

    #[test]
    fn offsets_clamp_to_the_input() {
        assert_eq!(offset_of("ab", 7, 9), 2);
        assert_eq!(offset_of("ab\ncd", 2, 2), 4);
    }
}
