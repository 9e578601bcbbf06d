//! The PyThia command-line interface.
//!
//! Parses arguments, installs logging and dispatches to the linter or a
//! translator. Failures surface as [`PythiaError`]s, rendered by miette.

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::errors::{ExitCode, PythiaError};
use crate::linter::{self, default_linter};
use crate::translator::{Backend, TranslationError};
use args::{Command, Input, PythiaArgs};
use output::Destination;

pub mod args;
pub mod input;
pub mod output;

/// Runs the binary: parse arguments, execute, report. Returns the exit code.
pub fn run() -> ExitCode {
    let args = PythiaArgs::parse();
    init_logging(&args);
    match execute(args.command) {
        Ok(()) => ExitCode::Success,
        Err(failure) => {
            let code = failure.exit_code();
            eprintln!("{:?}", miette::Report::new(failure));
            code
        }
    }
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the flags.
pub fn init_logging(args: &PythiaArgs) {
    let level = if args.quiet {
        "error"
    } else if args.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
    if let Err(reason) = installed {
        debug!("Keeping the existing subscriber: {reason}");
    }
}

pub fn execute(command: Command) -> Result<(), PythiaError> {
    match command {
        Command::Lint {
            extensive_diagnosis,
            json,
            input,
        } => lint(&input, extensive_diagnosis, json),
        Command::Translate {
            backend,
            force,
            input,
            output,
        } => translate(&input, backend, force, Destination::from(&output)),
    }
}

fn lint(input: &Input, extensive_diagnosis: bool, json: bool) -> Result<(), PythiaError> {
    let tree = input::load(input)?;
    let mut linter = default_linter().with_extensive_diagnosis(extensive_diagnosis);
    let diagnostics = linter.lint(&tree);
    output::report_diagnostics(&diagnostics, json)
}

fn translate(
    input: &Input,
    backend: Backend,
    force: bool,
    destination: Destination,
) -> Result<(), PythiaError> {
    let tree = input::load(input)?;
    let mut translator = backend.translator();
    if force {
        debug!("Skipping validation.");
    } else {
        translator = translator.with_validation(linter::validate);
    }
    let translation = translator.try_translate(&tree).map_err(|failure| match failure {
        TranslationError::Rejected(reasons) => PythiaError::Validation { reasons },
        TranslationError::Mapping(source) => {
            error!("Translation to {backend} failed.");
            PythiaError::Translation { backend, source }
        }
    })?;
    destination.write(&translation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_can_be_initialized_more_than_once() {
        let quiet = PythiaArgs::try_parse_from(["pythia", "-q", "lint", "--stdin"]).unwrap();
        let verbose = PythiaArgs::try_parse_from(["pythia", "-v", "lint", "--stdin"]).unwrap();
        init_logging(&quiet);
        init_logging(&verbose);
        debug!("Still logging.");
    }
}
