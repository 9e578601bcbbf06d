//! User-facing output: diagnostics on the terminal and translations to their
//! destination.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::args::Output;
use crate::diagnostics::{Diagnostic, DiagnosticReport, Severity};
use crate::errors::PythiaError;

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Prints diagnostics to stdout, one per line, as text or a JSON report.
pub fn report_diagnostics(diagnostics: &[Diagnostic], json: bool) -> Result<(), PythiaError> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let written = if json {
        let report = DiagnosticReport::new(diagnostics).to_json()?;
        writeln!(stdout, "{report}")
    } else {
        write_diagnostics(&mut stdout, diagnostics)
    };
    written.map_err(|source| PythiaError::Write {
        path: PathBuf::from("<stdout>"),
        source,
    })
}

/// Writes `   3:4: ERROR: message` lines with the severity coloured.
pub fn write_diagnostics(out: &mut impl WriteColor, diagnostics: &[Diagnostic]) -> io::Result<()> {
    for diagnostic in diagnostics {
        write!(out, "{:>4}:{}: ", diagnostic.line, diagnostic.column)?;
        out.set_color(ColorSpec::new().set_fg(Some(color(diagnostic.severity))).set_bold(true))?;
        write!(out, "{}", diagnostic.severity)?;
        out.reset()?;
        writeln!(out, ": {}", diagnostic.message)?;
    }
    Ok(())
}

fn color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Information => Color::Blue,
        Severity::Hint => Color::Cyan,
    }
}

// ============================================================================
// TRANSLATIONS
// ============================================================================

/// Where a translation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// A new file; existing files are left alone.
    Create(PathBuf),
    Overwrite(PathBuf),
    Append(PathBuf),
}

impl From<&Output> for Destination {
    fn from(output: &Output) -> Self {
        match (&output.output, &output.output_overwrite, &output.output_append) {
            (Some(path), _, _) => Destination::Create(path.clone()),
            (_, Some(path), _) => Destination::Overwrite(path.clone()),
            (_, _, Some(path)) => Destination::Append(path.clone()),
            _ => Destination::Stdout,
        }
    }
}

impl Destination {
    /// Writes `text` followed by a newline.
    pub fn write(&self, text: &str) -> Result<(), PythiaError> {
        let path = match self {
            Destination::Stdout => {
                let mut stdout = io::stdout().lock();
                return writeln!(stdout, "{text}").map_err(|source| PythiaError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                });
            }
            Destination::Create(path) | Destination::Overwrite(path) | Destination::Append(path) => {
                path
            }
        };
        let mut options = OpenOptions::new();
        match self {
            Destination::Create(_) => options.write(true).create_new(true),
            Destination::Overwrite(_) => options.write(true).create(true).truncate(true),
            _ => options.append(true).create(true),
        };
        let mut file = options.open(path).map_err(|source| open_error(path, source))?;
        writeln!(file, "{text}").map_err(|source| PythiaError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn open_error(path: &Path, source: io::Error) -> PythiaError {
    if source.kind() == io::ErrorKind::AlreadyExists {
        PythiaError::OutputExists {
            path: path.to_path_buf(),
        }
    } else {
        PythiaError::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::name;

    #[test]
    fn diagnostics_render_one_per_line() {
        let node = name("x").at(3, 4);
        let diagnostics = vec![
            Diagnostic::error(&node, "first"),
            Diagnostic::from_node(&node, "second", Severity::Hint),
        ];
        let mut buffer = termcolor::Buffer::no_color();
        write_diagnostics(&mut buffer, &diagnostics).unwrap();
        assert_eq!(
            String::from_utf8(buffer.into_inner()).unwrap(),
            "   3:4: ERROR: first\n   3:4: HINT: second\n"
        );
    }

    #[test]
    fn destinations_follow_the_flags() {
        let output = Output {
            output: None,
            output_overwrite: None,
            output_append: Some(PathBuf::from("out.jl")),
        };
        assert_eq!(
            Destination::from(&output),
            Destination::Append(PathBuf::from("out.jl"))
        );
    }

    #[test]
    fn files_are_created_truncated_or_appended() {
        let path = std::env::temp_dir().join(format!("pythia-output-{}.jl", std::process::id()));
        let _ = std::fs::remove_file(&path);
        Destination::Create(path.clone()).write("a").unwrap();
        let refused = Destination::Create(path.clone()).write("b").unwrap_err();
        assert!(matches!(refused, PythiaError::OutputExists { .. }));
        Destination::Append(path.clone()).write("c").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nc\n");
        Destination::Overwrite(path.clone()).write("d").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "d\n");
        std::fs::remove_file(&path).unwrap();
    }
}
