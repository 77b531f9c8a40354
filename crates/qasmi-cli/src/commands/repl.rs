//! Interactive evaluation against a persistent environment.
//!
//! Input is buffered until braces balance and the text ends a statement, so
//! gate bodies may span several lines. A line holding only a meta-command is
//! handled by the session itself:
//!
//! | Command         | Effect                                   |
//! |-----------------|------------------------------------------|
//! | `print`         | show every register and the quantum state |
//! | `clear`         | drop all declarations and reset the state |
//! | `quit` / `exit` | end the session                          |

use std::io::{self, BufRead, Write};

use anyhow::Result;
use console::style;
use tracing::debug;

use qasmi_eval::{EvalConfig, Evaluator, Value};
use qasmi_qasm3::{Parser, Token, tokenize};

use super::common::EvalArgs;

const PROMPT: &str = "qasmi> ";
const CONTINUATION: &str = "   ... ";

/// Execute the repl command on the process's stdin and stdout.
pub fn execute(args: &EvalArgs) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(args.config()).run(stdin.lock(), stdout.lock())
}

/// One REPL session.
pub struct Session {
    config: EvalConfig,
    evaluator: Evaluator,
    buffer: String,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            evaluator: Evaluator::with_config(config.clone()),
            config,
            buffer: String::new(),
        }
    }

    /// Read lines until end of input or `quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        let mut line = String::new();
        loop {
            let prompt = if self.buffer.is_empty() { PROMPT } else { CONTINUATION };
            write!(out, "{prompt}")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            if self.buffer.is_empty() {
                match line.trim() {
                    "" => continue,
                    "quit" | "exit" => break,
                    "print" => {
                        write!(out, "{}", self.evaluator.snapshot())?;
                        continue;
                    }
                    "clear" => {
                        debug!("clearing session state");
                        self.evaluator = Evaluator::with_config(self.config.clone());
                        continue;
                    }
                    _ => {}
                }
            }

            self.buffer.push_str(&line);
            if is_complete(&self.buffer) {
                let source = std::mem::take(&mut self.buffer);
                self.eval_source(&source, &mut out)?;
            }
        }
        Ok(())
    }

    /// Evaluate one complete chunk of input. Statements before a failing one
    /// keep their effects.
    fn eval_source<W: Write>(&mut self, source: &str, out: &mut W) -> Result<()> {
        let mut parser = Parser::new(source);
        let program = parser.parse();
        if !parser.errors().is_empty() {
            for err in parser.errors() {
                writeln!(out, "{} {err}", style("Error:").red().bold())?;
            }
            return Ok(());
        }

        for stmt in &program.statements {
            let result = self.evaluator.eval_stmt(stmt);
            for snapshot in self.evaluator.take_output() {
                write!(out, "{snapshot}")?;
            }
            match result {
                Ok(Value::None) => {}
                Ok(value) => writeln!(out, "{value}")?,
                Err(err) => {
                    writeln!(out, "{} {err}", style("Error:").red().bold())?;
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Braces are balanced and the last significant token is `;` or `}`.
/// Comments and string literals are single tokens, so braces inside them
/// do not count.
fn is_complete(source: &str) -> bool {
    let (tokens, _) = tokenize(source);
    let depth = tokens.iter().fold(0_i64, |depth, t| match t.token {
        Token::LBrace => depth + 1,
        Token::RBrace => depth - 1,
        _ => depth,
    });
    depth <= 0
        && matches!(
            tokens.last().map(|t| &t.token),
            Some(Token::Semicolon | Token::RBrace)
        )
}
