//! CLI command implementations.

pub mod common;
pub mod lex;
pub mod parse;
pub mod repl;
pub mod run;
pub mod version;
