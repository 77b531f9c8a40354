//! End-to-end tests of the `qasmi` binary.
//!
//! Each test writes a program to a temporary directory and runs the built
//! binary on it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const BELL: &str = "\
OPENQASM 3.0;
qubit[2] q;
bit[2] c;
h q[0];
ctrl @ x q[0], q[1];
c = measure q;
";

fn qasmi() -> Command {
    Command::new(env!("CARGO_BIN_EXE_qasmi"))
}

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn run(args: &[&str], file: &Path) -> Output {
    qasmi()
        .args(args)
        .arg(file)
        .env_remove("QASMI_SEED")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// lex
// ============================================================================

mod lex {
    use super::*;

    #[test]
    fn test_lex_prints_tokens() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "t.qasm", "qubit[2] q;\nh q;");
        let output = run(&["lex"], &file);

        assert!(output.status.success());
        let out = stdout(&output);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "QUBIT qubit",
                "LBRACKET [",
                "INT 2",
                "RBRACKET ]",
                "IDENT q",
                "SEMICOLON ;",
                "IDENT h",
                "IDENT q",
                "SEMICOLON ;",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_lex_reports_illegal_characters() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "t.qasm", "qubit $q;");
        let output = run(&["lex"], &file);

        assert!(!output.status.success());
        assert!(stdout(&output).contains("ILLEGAL $"));
        assert!(stdout(&output).trim_end().ends_with("EOF"));
        assert!(stderr(&output).contains("Error:"));
    }

    #[test]
    fn test_missing_file() {
        let output = run(&["lex"], Path::new("/nonexistent/prog.qasm"));
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("File not found"));
    }
}

// ============================================================================
// parse
// ============================================================================

mod parse {
    use super::*;

    #[test]
    fn test_parse_canonical_text() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "bell.qasm", BELL);
        let output = run(&["parse"], &file);

        assert!(output.status.success());
        let first = stdout(&output);
        assert_eq!(first.lines().count(), 6);

        // The canonical text parses to the same canonical text.
        let again = write_source(&dir, "again.qasm", &first);
        assert_eq!(stdout(&run(&["parse"], &again)), first);
    }

    #[test]
    fn test_parse_json() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "bell.qasm", BELL);
        let output = run(&["parse", "--json"], &file);

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["statements"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_parse_errors_exit_nonzero() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "bad.qasm", "qubit q;\nqubit[ r;\nh q;\nconst = 3;");
        let output = run(&["parse"], &file);

        assert_eq!(output.status.code(), Some(1));
        let err = stderr(&output);
        assert!(err.contains("Parse failed with 2 error(s)"));
    }
}

// ============================================================================
// run
// ============================================================================

mod run {
    use super::*;

    #[test]
    fn test_run_bell_is_correlated() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "bell.qasm", BELL);

        for seed in 0..8 {
            let output = run(&["run", "--seed", &seed.to_string()], &file);
            assert!(output.status.success(), "{}", stderr(&output));
            let out = stdout(&output);
            assert!(
                out.contains("c: 00") || out.contains("c: 11"),
                "uncorrelated result: {out}"
            );
        }
    }

    #[test]
    fn test_run_same_seed_same_output() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "bell.qasm", BELL);
        let a = run(&["run", "--seed", "42"], &file);
        let b = run(&["run", "--seed", "42"], &file);
        assert_eq!(stdout(&a), stdout(&b));
    }

    #[test]
    fn test_run_prints_snapshots() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "p.qasm", "qubit[2] q;\nx q[1];\nprint q;\n");
        let output = run(&["run"], &file);

        assert!(output.status.success());
        assert!(stdout(&output).contains("[01] +1.0000+0.0000i  1.0000"));
    }

    #[test]
    fn test_run_json() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "p.qasm", "qubit q;\nbit c;\nx q;\nprint q;\nc = measure q;\n");
        let output = run(&["run", "--json", "--seed", "1"], &file);

        assert!(output.status.success());
        let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(json["output"].as_array().unwrap().len(), 1);
        assert_eq!(json["final_state"]["bits"][0]["name"], "c");
        assert_eq!(json["final_state"]["bits"][0]["bits"][0], 1);
    }

    #[test]
    fn test_run_error_exit_code() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "e.qasm", "qubit q;\nbit c;\nc = 1 / 0;\n");
        let output = run(&["run"], &file);

        assert_eq!(output.status.code(), Some(1));
        let err = stderr(&output);
        assert!(err.contains("Evaluation failed"));
        assert!(err.contains("Division by zero"));
    }

    #[test]
    fn test_run_depth_limit_flag() {
        let dir = TempDir::new().unwrap();
        let source = "\
qubit q;
gate a r { x r; }
gate b r { a r; }
gate c r { b r; }
c q;
";
        let file = write_source(&dir, "d.qasm", source);

        assert!(run(&["run"], &file).status.success());
        let output = run(&["run", "--max-depth", "2"], &file);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Call depth exceeds the limit of 2"));
    }

    #[test]
    fn test_run_unroll_limit_flag() {
        let dir = TempDir::new().unwrap();
        let file = write_source(&dir, "p.qasm", "qubit q;\ngate g a { x a; }\npow(8) @ g q;\n");

        assert!(run(&["run"], &file).status.success());
        let output = run(&["run", "--max-unroll", "4"], &file);
        assert_eq!(output.status.code(), Some(1));
        assert!(stderr(&output).contains("Expanding 'g' exceeds the limit of 4 statements"));
    }
}

// ============================================================================
// repl
// ============================================================================

mod repl {
    use super::*;

    fn session(input: &str) -> Output {
        let mut child = qasmi()
            .args(["repl", "--seed", "5"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child
            .stdin
            .take()
            .unwrap()
            .write_all(input.as_bytes())
            .unwrap();
        child.wait_with_output().unwrap()
    }

    #[test]
    fn test_repl_session() {
        let output = session("qubit[2] q;\ngate flip a {\n  x a;\n}\nflip q[0];\nprint q;\nquit\n");
        assert!(output.status.success());
        assert!(stdout(&output).contains("[10] +1.0000+0.0000i  1.0000"));
    }

    #[test]
    fn test_repl_continues_after_error() {
        let output = session("qubit q;\nh nope;\nx q;\nprint q;\n");
        assert!(output.status.success());
        let out = stdout(&output);
        assert!(out.contains("Undefined identifier: nope"));
        assert!(out.contains("[1] +1.0000+0.0000i  1.0000"));
    }
}

// ============================================================================
// version
// ============================================================================

#[test]
fn test_version() {
    let output = qasmi().arg("version").output().unwrap();
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}
