//! End-to-end tests of the `luxc` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn luxc() -> Command {
    Command::cargo_bin("luxc").expect("luxc binary builds")
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, source).expect("source file is writable");
    path
}

#[test]
fn no_arguments_is_a_usage_error() {
    luxc()
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage: luxc <input-file> <output-file>"));
}

#[test]
fn one_argument_is_a_usage_error() {
    luxc()
        .arg("only.lux")
        .assert()
        .failure()
        .stderr(predicate::str::contains("usage"));
}

#[test]
fn missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.s");

    luxc()
        .arg(dir.path().join("nope.lux"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn compiles_a_simple_program() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "main.lux", "main : func () -> u64 { return 1 + 2 * 3; }");
    let output = dir.path().join("out.s");

    luxc()
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiling :"));

    let asm = fs::read_to_string(&output).expect("output file was written");
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("    mov $1, %rax"));
    assert!(asm.contains("    imul %rdi, %rax"));
}

#[test]
fn duplicate_declaration_exits_nonzero_with_context() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "dup.lux", "x : u32;\nx : u64;\n");
    let output = dir.path().join("out.s");

    luxc()
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("declaration is existing")
                .and(predicate::str::contains("^"))
                .and(predicate::str::contains("x : u64;")),
        );

    assert!(!output.exists());
}

#[test]
fn lexical_error_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "bad.lux", "main : func () { v : = 0123; }");
    let output = dir.path().join("out.s");

    luxc()
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("zero"));
}

#[test]
fn tree_dump_prints_on_request() {
    let dir = TempDir::new().unwrap();
    let input = write_source(&dir, "main.lux", "main : func () -> u64 { return 4; }");
    let output = dir.path().join("out.s");

    luxc()
        .env("LUXC_DUMP_TREE", "1")
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Function: main -> u64")
                .and(predicate::str::contains("|-->")),
        );
}
