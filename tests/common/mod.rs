//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use difference::{Changeset, Difference};
use pythia::ast::Node;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Deserializes a JSON syntax tree.
pub fn load_tree(path: &Path) -> Node {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|error| panic!("Failed to read '{}': {error}", path.display()));
    serde_json::from_str(&text)
        .unwrap_or_else(|error| panic!("Failed to parse '{}': {error}", path.display()))
}

/// Asserts equality, showing a line diff on mismatch.
pub fn assert_lines_eq(expected: &str, actual: &str) {
    if expected == actual {
        return;
    }
    let changeset = Changeset::new(expected, actual, "\n");
    let mut diff = String::new();
    for change in &changeset.diffs {
        let (marker, text) = match change {
            Difference::Same(text) => (' ', text),
            Difference::Add(text) => ('+', text),
            Difference::Rem(text) => ('-', text),
        };
        for line in text.lines() {
            diff.push(marker);
            diff.push_str(line);
            diff.push('\n');
        }
    }
    panic!("Output differs from the expectation (-expected +actual):\n{diff}");
}
