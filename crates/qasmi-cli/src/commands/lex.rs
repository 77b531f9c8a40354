//! Lex command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qasmi_qasm3::Lexer;

use super::common::read_file;

/// Execute the lex command: one `NAME text` line per token, then `EOF`.
pub fn execute(file: &Path) -> Result<()> {
    let source = read_file(file)?;
    let mut lexer = Lexer::new(&source);
    for token in lexer.by_ref() {
        println!("{} {}", token.token.name(), token.token);
    }
    println!("EOF");

    let errors = lexer.into_errors();
    for err in &errors {
        eprintln!("{} {err}", style("✗").red().bold());
    }
    if !errors.is_empty() {
        anyhow::bail!("{} lexer error(s)", errors.len());
    }
    Ok(())
}
