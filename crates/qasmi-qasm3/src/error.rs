//! Error types for the lexer and parser.

use std::fmt;

use thiserror::Error;

/// Errors recorded by the lexer. None of them stop tokenization.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LexError {
    /// Reading the source failed.
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),

    /// A character no token rule accepts.
    #[error("Illegal character at line {line}: '{text}'")]
    Illegal { line: usize, text: String },
}

/// Errors that can occur during parsing.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),

    /// Illegal character reached the parser.
    #[error("Illegal token at line {line}: '{text}'")]
    IllegalToken { line: usize, text: String },

    /// Invalid version.
    #[error("Invalid OPENQASM version at line {line}: {found}")]
    InvalidVersion { line: usize, found: String },

    /// Version declaration after other statements.
    #[error("OPENQASM version declaration must be the first statement (line {0})")]
    MisplacedVersion(usize),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Every error collected while parsing one source.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the errors in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.0.iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
