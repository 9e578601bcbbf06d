//! Golden translations of the JSON models under `tests/fixtures`.
//!
//! Every `<model>.json` is translated for each backend that has a sibling
//! `<model>.<backend>.py` or `<model>.<backend>.jl` file.

mod common;

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use pythia::{validate, Backend};
use walkdir::WalkDir;

fn expectation(model: &Path, backend: Backend) -> Option<String> {
    ["py", "jl"].iter().find_map(|extension| {
        let path = model.with_extension(format!("{backend}.{extension}"));
        fs::read_to_string(path).ok()
    })
}

#[test]
fn fixtures_translate_to_their_goldens() {
    let mut checked = 0;
    for entry in WalkDir::new(common::fixtures_dir())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|extension| extension == "json"))
    {
        let model = entry.path();
        let tree = common::load_tree(model);
        for backend in Backend::value_variants() {
            let Some(expected) = expectation(model, *backend) else {
                continue;
            };
            let translation = backend
                .translator()
                .with_validation(validate)
                .translate(&tree)
                .unwrap_or_else(|| panic!("{} failed for '{}'", backend, model.display()));
            common::assert_lines_eq(expected.trim_end(), &translation);
            checked += 1;
        }
    }
    assert!(checked >= 4, "only {checked} golden translations were found");
}

#[test]
fn fixtures_lint_clean() {
    for entry in WalkDir::new(common::fixtures_dir())
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|extension| extension == "json"))
    {
        let tree = common::load_tree(entry.path());
        let diagnostics = pythia::default_linter().lint(&tree);
        assert!(diagnostics.is_empty(), "{}: {diagnostics:?}", entry.path().display());
    }
}
