//! Parser for the `OpenQASM` 3 subset.
//!
//! The parser never gives up on the first error. Each failed statement is
//! recorded, the token stream is resynchronised at the next statement
//! boundary and parsing carries on, so one run reports every independent
//! syntax error. Callers must check [`Parser::errors`] after [`Parser::parse`].

mod expression;
mod statement;

use tracing::debug;

use crate::ast::{Decl, Program, Stmt};
use crate::error::{ParseError, ParseErrors, ParseResult};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a source string into a program, failing with every collected error.
pub fn parse(source: &str) -> Result<Program, ParseErrors> {
    let mut parser = Parser::new(source);
    let program = parser.parse();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(ParseErrors(parser.into_errors()))
    }
}

/// Parser state.
pub struct Parser {
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
    errors: Vec<ParseError>,
}

#[allow(clippy::needless_pass_by_value)]
impl Parser {
    /// Create a parser over the significant tokens of `source`.
    ///
    /// Illegal characters are not reported here; they surface as
    /// [`ParseError::IllegalToken`] when the parser reaches them.
    pub fn new(source: &str) -> Self {
        let (tokens, _) = tokenize(source);
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    /// Parse the whole token stream into a best-effort program.
    pub fn parse(&mut self) -> Program {
        let statements = self.parse_statements(true);
        debug!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        Program { statements }
    }

    /// Syntax errors collected so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consume the parser, returning its errors.
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    /// Parse statements until end of input (top level) or a closing `}`
    /// (block bodies; the brace itself is left for the caller).
    pub(super) fn parse_statements(&mut self, top_level: bool) -> Vec<Stmt> {
        let mut statements = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(Token::RBrace) if !top_level => break,
                _ => {}
            }

            let start = self.pos;
            let line = self.line();
            match self.parse_statement() {
                Ok(Stmt::Decl(Decl::Version(_))) if !(top_level && statements.is_empty()) => {
                    self.errors.push(ParseError::MisplacedVersion(line));
                }
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.synchronize(start);
                }
            }
        }
        statements
    }

    /// Skip to the next statement boundary after an error: just past the next
    /// `;`, or up to the next `}` or declaration keyword. A statement that
    /// made no progress always loses at least one token.
    fn synchronize(&mut self, start: usize) {
        if self.pos == start {
            if matches!(self.advance(), Some(Token::Semicolon | Token::RBrace)) {
                return;
            }
        } else if self.previous_is(&Token::Semicolon) {
            return;
        }

        while let Some(token) = self.peek() {
            match token {
                Token::Semicolon => {
                    self.advance();
                    return;
                }
                Token::RBrace
                | Token::OpenQasm
                | Token::Include
                | Token::Const
                | Token::Gate
                | Token::Def
                | Token::Qubit
                | Token::Bit => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek `n` tokens past the current one.
    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Line of the current token, or of the last token at end of input.
    pub(super) fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn previous_is(&self, token: &Token) -> bool {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .is_some_and(|t| std::mem::discriminant(&t.token) == std::mem::discriminant(token))
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Expect a specific token. A mismatched token is left in place.
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{expected}'")))
        }
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Build the error for the current token not matching `expected`.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let line = self.line();
        match self.peek() {
            None => ParseError::UnexpectedEof(expected.to_string()),
            Some(Token::Illegal(text)) => ParseError::IllegalToken {
                line,
                text: text.clone(),
            },
            Some(found) => ParseError::UnexpectedToken {
                line,
                expected: expected.to_string(),
                found: format!("'{found}'"),
            },
        }
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Identifier(name)) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parse a non-empty, comma-separated identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};

    #[test]
    fn test_parse_bell_state() {
        let source = r"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        ";

        let program = parse(source).unwrap();
        assert_eq!(program.version(), Some("3.0"));
        assert_eq!(program.statements.len(), 6);
        assert_eq!(program.statements[5].to_string(), "c = measure q;");
    }

    #[test]
    fn test_errors_accumulate() {
        let source = "qubit q;\nh q\nqubit r;\nx ) r;\nz r;";
        let mut parser = Parser::new(source);
        let program = parser.parse();

        assert_eq!(parser.errors().len(), 2);
        assert!(matches!(
            parser.errors()[0],
            ParseError::UnexpectedToken { line: 3, .. }
        ));
        assert!(matches!(
            parser.errors()[1],
            ParseError::UnexpectedToken { line: 4, .. }
        ));

        // The statements around the broken ones survive.
        let text: Vec<String> = program.statements.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["qubit q;", "qubit r;", "z r;"]);
    }

    #[test]
    fn test_resync_inside_block() {
        let mut parser = Parser::new("gate g q { h q x q; z q; } g r;");
        let program = parser.parse();
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[0].to_string(), "gate g q { z q; }");
    }

    #[test]
    fn test_stray_closing_brace() {
        let mut parser = Parser::new("} h q;");
        let program = parser.parse();
        assert_eq!(parser.errors().len(), 1);
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_misplaced_version() {
        let mut parser = Parser::new("qubit q;\nOPENQASM 3.0;\nh q;");
        let program = parser.parse();
        assert_eq!(parser.errors(), &[ParseError::MisplacedVersion(2)]);
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.version(), None);
    }

    #[test]
    fn test_illegal_token_reported() {
        let err = parse("h $;").unwrap_err();
        assert!(
            err.iter()
                .any(|e| matches!(e, ParseError::IllegalToken { text, .. } if text == "$"))
        );
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse("gate g q { h q;").unwrap_err();
        assert!(err.iter().any(|e| matches!(e, ParseError::UnexpectedEof(_))));
    }

    #[test]
    fn test_empty_source() {
        let program = parse("  // nothing here\n").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_pi_becomes_identifier() {
        let program = parse("U(π, 0, tau) q;").unwrap();
        let Stmt::Apply(apply) = &program.statements[0] else {
            panic!("expected apply statement");
        };
        assert_eq!(apply.params[0], Expr::ident("pi"));
        assert_eq!(apply.params[2], Expr::ident("tau"));
    }
}
