//! Whole-program parsing tests.

use qasmi_qasm3::syntax::{Decl, Expr, ModifierKind, Stmt};
use qasmi_qasm3::{ParseError, Parser, Token, parse, tokenize};

const SHOR: &str = r"
OPENQASM 3.0;
include 'stdgates.inc';

const N = 15;
const a = 7;

qubit[3] r0;
qubit[4] r1;
bit[3] c;

reset r0, r1;
X r1[-1];
H r0;
CMODEXP2(a, N) r0, r1;
IQFT r0;
c = measure r0;
";

const GATES: &str = r"
OPENQASM 3.0;

gate bell q0, q1 {
    h q0;
    cx q0, q1;
}

gate rot(theta) q {
    U(theta, 0, 0) q;
}

def xm(qubit q) -> bit {
    h q;
    return measure q;
}

qubit[2] q;
bit m;
ctrl @ bell q[0], q[1], q;
inv @ rot(pi / 4) q[0];
pow(2) @ rot(tau / 8) q[1];
m = xm(q[0]);
print q, m;
";

#[test]
fn test_shor_program() {
    let program = parse(SHOR).unwrap();
    assert_eq!(program.version(), Some("3.0"));
    assert_eq!(program.statements.len(), 13);
    assert_eq!(program.statements[1], Stmt::Include("stdgates.inc".into()));
    assert_eq!(program.statements[10].to_string(), "CMODEXP2(a, N) r0, r1;");

    let sizes: Vec<_> = program
        .statements
        .iter()
        .filter_map(|s| match s {
            Stmt::Decl(Decl::Gen(g)) => g.size(),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![3, 4, 3]);
}

#[test]
fn test_gates_and_subroutines() {
    let program = parse(GATES).unwrap();

    let names: Vec<_> = program
        .statements
        .iter()
        .filter_map(|s| match s {
            Stmt::Decl(d) => d.ident(),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["bell", "rot", "xm", "q", "m"]);

    let Stmt::Expr(Expr::Call(call)) = &program.statements[6] else {
        panic!("expected a call statement");
    };
    assert_eq!(call.name, "bell");
    assert_eq!(call.modifiers[0].kind, ModifierKind::Ctrl);
    assert_eq!(call.qargs.len(), 3);
}

#[test]
fn test_canonical_text_is_stable() {
    for source in [SHOR, GATES] {
        let first = parse(source).unwrap().to_string();
        let second = parse(&first).unwrap().to_string();
        assert_eq!(first, second);
    }
}

#[test]
fn test_ast_serializes_to_json() {
    let program = parse("qubit q;\nh q;").unwrap();
    let json = serde_json::to_string(&program).unwrap();
    assert!(json.contains("\"statements\""));
    assert!(json.contains("\"Call\""));
}

#[test]
fn test_every_error_is_reported() {
    let source = "qubit q;\nqubit[ r;\nh q;\nconst = 3;\nx q;";
    let mut parser = Parser::new(source);
    let program = parser.parse();

    let lines: Vec<_> = parser
        .errors()
        .iter()
        .map(|e| match e {
            ParseError::UnexpectedToken { line, .. } => *line,
            other => panic!("unexpected error kind: {other}"),
        })
        .collect();
    assert_eq!(lines, vec![2, 4]);
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn test_errors_display_one_per_line() {
    let err = parse("qubit;\nbit;").unwrap_err();
    assert_eq!(err.len(), 2);
    assert_eq!(err.to_string().lines().count(), 2);
}

#[test]
fn test_lexer_spec_sequence() {
    let (tokens, errors) = tokenize("gate cx q, p { ctrl @ x q, p; }");
    assert!(errors.is_empty());
    let names: Vec<_> = tokens.iter().map(|t| t.token.name()).collect();
    assert_eq!(
        names,
        vec![
            "GATE",
            "IDENT",
            "IDENT",
            "COMMA",
            "IDENT",
            "LBRACE",
            "CTRL",
            "AT",
            "IDENT",
            "IDENT",
            "COMMA",
            "IDENT",
            "SEMICOLON",
            "RBRACE"
        ]
    );
    assert_eq!(tokens[1].token, Token::Identifier("cx".into()));
}
