//! Loading the syntax tree handed over by the parser.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::args::Input;
use crate::ast::Node;
use crate::errors::PythiaError;

const STDIN: &str = "<stdin>";

/// Reads and deserializes the tree named by `input`.
pub fn load(input: &Input) -> Result<Node, PythiaError> {
    let (name, text) = match &input.file {
        Some(path) => (path.display().to_string(), read_file(path)?),
        None => (STDIN.to_string(), read_stdin()?),
    };
    debug!("Read {} bytes from {name}.", text.len());
    parse(&name, &text)
}

/// Deserializes a JSON tree; `name` labels the input in error reports.
pub fn parse(name: &str, text: &str) -> Result<Node, PythiaError> {
    serde_json::from_str(text).map_err(|error| PythiaError::parse(name, text, &error))
}

fn read_file(path: &Path) -> Result<String, PythiaError> {
    fs::read_to_string(path).map_err(|source| PythiaError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_stdin() -> Result<String, PythiaError> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|source| PythiaError::Read {
            path: PathBuf::from(STDIN),
            source,
        })?;
    Ok(text)
}
