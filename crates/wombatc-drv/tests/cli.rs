//! End-to-end driver tests.
//!
//! Every compilation here uses `-C`, so the tests assert on the generated
//! assembly text and never need `nasm` or `ld` on the host.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn wombatc() -> Command {
    Command::cargo_bin("wombatc").expect("binary builds")
}

/// Writes a source file into a fresh temp dir and returns both.
fn source(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write source");
    (dir, path)
}

#[test]
fn version_flag() {
    wombatc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("wombatc "));
}

#[test]
fn help_flag() {
    wombatc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("usage: wombatc"))
        .stdout(predicate::str::contains("-ast"))
        .stdout(predicate::str::contains("-lx"));
}

#[test]
fn no_arguments_is_a_usage_error() {
    wombatc()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("no input file"))
        .stderr(predicate::str::contains("usage: wombatc"));
}

#[test]
fn unknown_option_is_a_usage_error() {
    wombatc()
        .args(["--what", "x.wo"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("unknown option '--what'"));
}

#[test]
fn missing_file_is_reported() {
    wombatc()
        .args(["-C", "does-not-exist.wo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such file"));
}

#[test]
fn wrong_extension_is_rejected_before_lexing() {
    let (_dir, path) = source("prog.txt", "fn int main()\n  return 0;\nend");
    wombatc()
        .arg("-C")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid source extension"))
        .stderr(predicate::str::contains(".wo"));
}

#[test]
fn compile_only_writes_assembly() {
    let (dir, path) = source("prog.wo", "fn int main()\n  return 1 + 2 * 3;\nend");
    wombatc().arg("-C").arg(&path).assert().success();

    let asm_path = dir.path().join("prog.asm");
    let asm = std::fs::read_to_string(&asm_path).expect("assembly written");
    assert!(asm.starts_with("global _start"));
    assert!(asm.contains("extern putnum"));
    assert!(asm.contains("section .text"));
    assert!(asm.contains("call main"));
    assert!(asm.contains("main:"));
}

#[test]
fn token_dump_flag() {
    let (_dir, path) = source("prog.wo", "fn free main()\n  quit(0);\nend");
    wombatc()
        .args(["-C", "-lx"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Keyword"))
        .stdout(predicate::str::contains("\"quit\""))
        .stdout(predicate::str::contains("Eof"));
}

#[test]
fn ast_dump_flag() {
    let (_dir, path) = source(
        "prog.wo",
        "fn int main()\n  mut x: int = 4;\n  return x;\nend",
    );
    wombatc()
        .args(["-C", "-ast"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("fn main () -> int"))
        .stdout(predicate::str::contains("mut x: int"));
}

#[test]
fn lex_error_renders_pretty_diagnostic() {
    let (_dir, path) = source("prog.wo", "fn free main()\n  let s: [3]char = \"abc;\nend");
    wombatc()
        .arg("-C")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("critical"))
        .stderr(predicate::str::contains("unterminated string literal"))
        .stderr(predicate::str::contains("prog.wo:2:"));
}

#[test]
fn parse_error_stops_the_pipeline() {
    let (dir, path) = source("prog.wo", "fn int main()\n  return 1 +;\nend");
    wombatc()
        .arg("-C")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("critical"))
        .stderr(predicate::str::contains("expected expression"));
    assert!(!dir.path().join("prog.asm").exists());
}

#[test]
fn semantic_error_names_the_variable() {
    let (dir, path) = source(
        "prog.wo",
        "fn free main()\n  let y: int = 1;\n  y = 2;\nend",
    );
    wombatc()
        .arg("-C")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'y' is not mutable."));
    assert!(!dir.path().join("prog.asm").exists());
}

#[test]
fn type_mismatch_names_both_types() {
    let (_dir, path) = source("prog.wo", "fn free main()\n  mut z: bool = 3;\nend");
    wombatc()
        .arg("-C")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bool"))
        .stderr(predicate::str::contains("int"));
}

#[test]
fn pointer_arithmetic_compiles() {
    let (dir, path) = source(
        "prog.wo",
        "fn int f(p: ptr<int>, q: ptr<int>)\n  return p - q;\nend\nfn free main()\n  quit(0);\nend",
    );
    wombatc().arg("-C").arg(&path).assert().success();

    let asm = std::fs::read_to_string(dir.path().join("prog.asm")).unwrap();
    assert!(asm.contains("sub rax, rbx"));
}

#[test]
fn six_register_call_compiles() {
    let (dir, path) = source(
        "prog.wo",
        "fn free main()\n  putnum(1);\n  quit(0);\nend",
    );
    wombatc().arg("-C").arg(&path).assert().success();

    let asm = std::fs::read_to_string(dir.path().join("prog.asm")).unwrap();
    assert!(asm.contains("mov rdi, 1"));
    assert!(asm.contains("call putnum"));
}

#[test]
fn quiet_flag_suppresses_stage_logs() {
    let (_dir, path) = source("prog.wo", "fn int main()\n  return 0;\nend");
    wombatc()
        .args(["-C", "-q"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn verbose_flag_logs_stages() {
    let (_dir, path) = source("prog.wo", "fn int main()\n  return 0;\nend");
    wombatc()
        .args(["-C", "-v0"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("parsing"))
        .stderr(predicate::str::contains("emitting assembly"));
}
