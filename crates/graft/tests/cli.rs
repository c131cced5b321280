//! End-to-end runs of the `graft` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn graft() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("graft").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_writes_units_under_package_path() {
    let out = TempDir::new().unwrap();

    graft()
        .arg(fixture("if_stmt.json"))
        .arg(out.path())
        .assert()
        .success();

    let package = out.path().join("demo").join("ast");
    for unit in ["stmt", "if_stmt", "block", "expr", "ident", "paren", "parser", "mod"] {
        assert!(package.join(format!("{unit}.rs")).exists(), "missing {unit}.rs");
    }

    let if_stmt = std::fs::read_to_string(package.join("if_stmt.rs")).unwrap();
    assert!(if_stmt.contains("pub struct IfStmt {"));
    assert!(if_stmt.contains("impl rt::Unparse for IfStmt {"));
    assert!(if_stmt.contains("impl Stmt for IfStmt {}"));

    let parser = std::fs::read_to_string(package.join("parser.rs")).unwrap();
    for routine in ["can_parse_if_stmt", "parse_if_stmt", "make_if_stmt"] {
        assert!(parser.contains(&format!("pub fn {routine}(")), "missing {routine}");
    }
}

#[test]
fn test_invalid_schema_fails_with_diagnostic() {
    let out = TempDir::new().unwrap();

    graft()
        .arg(fixture("unknown_alternative.json"))
        .arg(out.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "undefined alternative 'missing' listed by rule 'stmt'",
        ));

    assert!(!out.path().join("demo").exists());
}

#[test]
fn test_check_writes_nothing() {
    let out = TempDir::new().unwrap();

    graft()
        .arg(fixture("if_stmt.json"))
        .arg(out.path())
        .arg("--check")
        .assert()
        .success();

    assert!(!out.path().join("demo").exists());
}

#[test]
fn test_missing_schema_file() {
    let out = TempDir::new().unwrap();

    graft()
        .arg(out.path().join("nope.json"))
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}
