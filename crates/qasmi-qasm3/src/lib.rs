//! `OpenQASM` 3 subset front end for qasmi
//!
//! This crate turns source text into an abstract syntax tree and back. The
//! evaluator in `qasmi-eval` walks the tree this crate produces.
//!
//! # Supported Features
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version declaration | ✅ | `OPENQASM 3.0;` |
//! | Register declarations | ✅ | `qubit[2] q;`, `bit c;` |
//! | Constants | ✅ | `const n = 3;`, `const float x = pi / 2;` |
//! | Built-in gates | ✅ | `U(pi, 0, pi) q;`, `H q;`, `QFT r;` |
//! | Gate modifiers | ✅ | `ctrl @ inv @ X c, t;`, `pow(2) @ S q;` |
//! | Gate definitions | ✅ | `gate bell a, b { h a; cx a, b; }` |
//! | Subroutines | ✅ | `def f(qubit q) -> bit { return measure q; }` |
//! | Measurement | ✅ | `c = measure q;`, `measure q -> c;` |
//! | Reset, print | ✅ | `reset q;`, `print q, c;` |
//! | Comments | ✅ | `// comment`, `/* block */` |
//!
//! # Example: Parsing
//!
//! ```rust
//! use qasmi_qasm3::parse;
//!
//! let source = r#"
//!     OPENQASM 3.0;
//!     qubit[2] q;
//!     bit[2] c;
//!     h q[0];
//!     cx q[0], q[1];
//!     c = measure q;
//! "#;
//!
//! let program = parse(source).unwrap();
//! assert_eq!(program.version(), Some("3.0"));
//! assert_eq!(program.statements.len(), 6);
//! ```
//!
//! # Example: Round-Trip
//!
//! Every node prints as canonical source text, and printing is stable under
//! reparsing:
//!
//! ```rust
//! use qasmi_qasm3::parse;
//!
//! let program = parse("gate g(t) a,b{ctrl@U(t,0,-(1+2)) a,b;}").unwrap();
//! let text = program.to_string();
//! assert_eq!(text, "gate g(t) a, b { ctrl @ U(t, 0, -(1 + 2)) a, b; }\n");
//! assert_eq!(parse(&text).unwrap().to_string(), text);
//! ```
//!
//! # Error Recovery
//!
//! Parsing does not stop at the first mistake. [`parse`] returns every
//! collected error; [`Parser`] exposes the best-effort tree as well.

mod ast;
mod emitter;
mod error;
pub mod lexer;
mod parser;

pub use error::{LexError, ParseError, ParseErrors, ParseResult};
pub use lexer::{Lexer, SpannedToken, Token, read_source, tokenize};
pub use parser::{Parser, parse};

// Re-export AST types for the evaluator and tools
pub mod syntax {
    pub use crate::ast::*;
}
