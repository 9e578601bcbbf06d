// Exit codes and rendered errors of the `pythia` binary.

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn pythia() -> Command {
    Command::cargo_bin("pythia").unwrap()
}

fn cointoss() -> String {
    common::fixtures_dir().join("cointoss.json").display().to_string()
}

fn scratch(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pythia-cli-{}-{name}", std::process::id()))
}

#[test]
fn malformed_trees_are_parse_errors() {
    pythia()
        .args(["lint", "--stdin"])
        .write_stdin("{\"kind\": \"Module\", \"body\": [")
        .assert()
        .code(12)
        .stderr(contains("pythia::parse"));
}

#[test]
fn missing_files_are_read_errors() {
    pythia()
        .args(["translate", "pyro", "/nonexistent/model.json"])
        .assert()
        .code(11)
        .stderr(contains("pythia::read"));
}

#[test]
fn invalid_models_are_refused_unless_forced() {
    let input = r#"{"kind": "Module", "body": [{"kind": "Import", "names": [{"name": "os"}]}]}"#;
    pythia()
        .args(["translate", "turing", "--stdin"])
        .write_stdin(input)
        .assert()
        .code(13)
        .stderr(contains("pythia::validation").and(contains("outside of probabilistic programs")));
    pythia()
        .args(["translate", "turing", "--force", "--stdin"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("using Turing").and(contains("import os")));
}

#[test]
fn existing_outputs_are_not_overwritten() {
    let target = scratch("existing.jl");
    fs::write(&target, "keep\n").unwrap();
    pythia()
        .args(["translate", "gen", &cointoss(), "-o"])
        .arg(&target)
        .assert()
        .code(14)
        .stderr(contains("pythia::write"));
    assert_eq!(fs::read_to_string(&target).unwrap(), "keep\n");

    pythia()
        .args(["translate", "gen", &cointoss(), "--output-overwrite"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(fs::read_to_string(&target).unwrap().starts_with("using Gen\n"));
    fs::remove_file(&target).unwrap();
}

#[test]
fn translations_go_to_stdout_by_default() {
    let expected = fs::read_to_string(common::fixtures_dir().join("cointoss.turing.jl")).unwrap();
    pythia()
        .args(["translate", "turing", &cointoss()])
        .assert()
        .success()
        .stdout(expected);
}

#[test]
fn lint_reports_as_json() {
    let input = r#"{"kind": "Module", "body": [
        {"kind": "FunctionDef", "name": "m",
         "decorators": [{"kind": "Name", "id": "probabilistic_program"}],
         "body": [{"kind": "Pass", "span": {"line": 3, "column": 4}}]}]}"#;
    let output = pythia()
        .args(["lint", "--json", "--stdin"])
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["message"], "Pass statements are prohibited");
    assert_eq!(diagnostics[0]["severity"], "ERROR");
    assert_eq!(diagnostics[0]["line"], 3);
}

#[test]
fn clean_models_lint_silently() {
    pythia()
        .args(["lint", &cointoss()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
