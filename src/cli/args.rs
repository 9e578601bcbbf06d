//! Command-line arguments and subcommands of the `pythia` binary.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

use crate::translator::Backend;

#[derive(Debug, Parser)]
#[command(
    name = "pythia",
    version,
    about = "Lints PyThia probabilistic programs and translates them to Pyro, Turing or Gen."
)]
pub struct PythiaArgs {
    /// Log mapping and rule decisions.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Log errors only.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report rule violations in a model.
    Lint {
        /// Keep checking the children of nodes that violate a rule.
        #[arg(short, long)]
        extensive_diagnosis: bool,

        /// Print the diagnostics as a JSON report.
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        input: Input,
    },
    /// Translate a model to a probabilistic-programming framework.
    Translate {
        /// The target framework.
        #[arg(value_enum)]
        backend: Backend,

        /// Translate even if the model fails validation.
        #[arg(short, long)]
        force: bool,

        #[command(flatten)]
        input: Input,

        #[command(flatten)]
        output: Output,
    },
}

/// Where the JSON syntax tree is read from.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["file", "stdin"])))]
pub struct Input {
    /// The syntax tree of the model, as JSON.
    pub file: Option<PathBuf>,

    /// Read the syntax tree from standard input.
    #[arg(long)]
    pub stdin: bool,
}

/// Where the translation is written; standard output by default.
#[derive(Debug, Args)]
#[command(group(ArgGroup::new("destination").args(["output", "output_overwrite", "output_append"])))]
pub struct Output {
    /// Write to a new file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write to a file, truncating it first.
    #[arg(long, value_name = "PATH")]
    pub output_overwrite: Option<PathBuf>,

    /// Append to a file.
    #[arg(long, value_name = "PATH")]
    pub output_append: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_are_consistent() {
        use clap::CommandFactory;
        PythiaArgs::command().debug_assert();
    }

    #[test]
    fn backends_parse_by_name() {
        let args = PythiaArgs::try_parse_from(["pythia", "translate", "gen-choicemap", "m.json"])
            .unwrap();
        let Command::Translate { backend, force, .. } = args.command else {
            panic!("expected translate");
        };
        assert_eq!(backend, Backend::GenChoicemap);
        assert!(!force);
    }

    #[test]
    fn a_source_is_required() {
        assert!(PythiaArgs::try_parse_from(["pythia", "lint"]).is_err());
        assert!(PythiaArgs::try_parse_from(["pythia", "lint", "--stdin", "m.json"]).is_err());
    }
}
