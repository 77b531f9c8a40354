//! Lexer for the `OpenQASM` 3 subset.
//!
//! [`Lexer::scan`] returns every token, whitespace and comments included, so
//! tools can reproduce the source exactly. [`Lexer::tokenize`] is what the
//! parser consumes: the same stream with the trivia filtered out.
//!
//! The lexer never aborts. Characters it does not recognise come back as
//! [`Token::Illegal`] and are also recorded in [`Lexer::errors`].

use std::io::BufRead;
use std::ops::Range;

use logos::Logos;
use tracing::warn;

use crate::error::LexError;

/// Tokens for the `OpenQASM` 3 subset.
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Trivia
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
    Comment,

    // Keywords
    #[token("OPENQASM")]
    OpenQasm,

    #[token("include")]
    Include,

    #[token("qubit")]
    Qubit,

    #[token("bit")]
    Bit,

    #[token("int")]
    Int,

    #[token("uint")]
    Uint,

    #[token("float")]
    Float,

    #[token("angle")]
    Angle,

    #[token("const")]
    Const,

    #[token("gate")]
    Gate,

    #[token("def")]
    Def,

    #[token("return")]
    Return,

    #[token("measure")]
    Measure,

    #[token("reset")]
    Reset,

    #[token("print")]
    Print,

    // Gate modifiers
    #[token("ctrl")]
    Ctrl,

    #[token("negctrl")]
    NegCtrl,

    #[token("inv")]
    Inv,

    #[token("pow")]
    Pow,

    // Built-in gates (higher priority than identifier)
    #[token("U", priority = 3)]
    GateU,

    #[token("X", priority = 3)]
    GateX,

    #[token("Y", priority = 3)]
    GateY,

    #[token("Z", priority = 3)]
    GateZ,

    #[token("H", priority = 3)]
    GateH,

    #[token("S", priority = 3)]
    GateS,

    #[token("T", priority = 3)]
    GateT,

    #[token("QFT")]
    Qft,

    #[token("IQFT")]
    Iqft,

    #[token("CMODEXP2")]
    CModExp2,

    // Constants
    #[token("pi")]
    #[token("π")]
    Pi,

    #[token("tau")]
    #[token("τ")]
    Tau,

    #[token("euler")]
    #[token("ℇ")]
    Euler,

    // Literals
    // Digits and dots after the first `.` stay in one literal; `1.2.3` is a
    // single malformed float.
    #[regex(r"[0-9]+\.[0-9.]*([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+", |lex| lex.slice().to_string())]
    FloatLiteral(String),

    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r#""[^"]*"?"#, string_literal)]
    #[regex(r"'[^']*'?", string_literal)]
    StringLiteral(String),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // Operators and punctuation
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("=")]
    Eq,

    #[token("->")]
    Arrow,

    #[token("@")]
    At,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    /// Any single character no other rule accepts.
    #[regex(r".", |lex| lex.slice().to_string(), priority = 0)]
    Illegal(String),
}

/// Strips the quotes from a string literal. An unterminated literal keeps
/// everything up to the end of input.
fn string_literal(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let quote = &slice[..1];
    let body = &slice[1..];
    match body.strip_suffix(quote) {
        Some(inner) => inner.to_string(),
        None => {
            warn!(literal = slice, "unterminated string literal");
            body.to_string()
        }
    }
}

impl Token {
    /// Upper-case kind name, as printed by `qasmi lex`.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Whitespace => "WS",
            Token::Comment => "COMMENT",
            Token::OpenQasm => "OPENQASM",
            Token::Include => "INCLUDE",
            Token::Qubit => "QUBIT",
            Token::Bit => "BIT",
            Token::Int => "INT_TYPE",
            Token::Uint => "UINT_TYPE",
            Token::Float => "FLOAT_TYPE",
            Token::Angle => "ANGLE_TYPE",
            Token::Const => "CONST",
            Token::Gate => "GATE",
            Token::Def => "DEF",
            Token::Return => "RETURN",
            Token::Measure => "MEASURE",
            Token::Reset => "RESET",
            Token::Print => "PRINT",
            Token::Ctrl => "CTRL",
            Token::NegCtrl => "NEGCTRL",
            Token::Inv => "INV",
            Token::Pow => "POW",
            Token::GateU => "U",
            Token::GateX => "X",
            Token::GateY => "Y",
            Token::GateZ => "Z",
            Token::GateH => "H",
            Token::GateS => "S",
            Token::GateT => "T",
            Token::Qft => "QFT",
            Token::Iqft => "IQFT",
            Token::CModExp2 => "CMODEXP2",
            Token::Pi => "PI",
            Token::Tau => "TAU",
            Token::Euler => "EULER",
            Token::FloatLiteral(_) => "FLOAT",
            Token::IntLiteral(_) => "INT",
            Token::StringLiteral(_) => "STRING",
            Token::Identifier(_) => "IDENT",
            Token::Plus => "PLUS",
            Token::Minus => "MINUS",
            Token::Star => "STAR",
            Token::Slash => "SLASH",
            Token::Percent => "PERCENT",
            Token::Eq => "ASSIGN",
            Token::Arrow => "ARROW",
            Token::At => "AT",
            Token::LParen => "LPAREN",
            Token::RParen => "RPAREN",
            Token::LBracket => "LBRACKET",
            Token::RBracket => "RBRACKET",
            Token::LBrace => "LBRACE",
            Token::RBrace => "RBRACE",
            Token::Semicolon => "SEMICOLON",
            Token::Comma => "COMMA",
            Token::Illegal(_) => "ILLEGAL",
        }
    }

    /// Whitespace and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Comment)
    }

    /// Tokens that start a type in declarations and subroutine signatures.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            Token::Qubit | Token::Bit | Token::Int | Token::Uint | Token::Float | Token::Angle
        )
    }

    /// Tokens that start a gate modifier.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Token::Ctrl | Token::NegCtrl | Token::Inv | Token::Pow)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Whitespace => write!(f, " "),
            Token::Comment => write!(f, "//"),
            Token::OpenQasm => write!(f, "OPENQASM"),
            Token::Include => write!(f, "include"),
            Token::Qubit => write!(f, "qubit"),
            Token::Bit => write!(f, "bit"),
            Token::Int => write!(f, "int"),
            Token::Uint => write!(f, "uint"),
            Token::Float => write!(f, "float"),
            Token::Angle => write!(f, "angle"),
            Token::Const => write!(f, "const"),
            Token::Gate => write!(f, "gate"),
            Token::Def => write!(f, "def"),
            Token::Return => write!(f, "return"),
            Token::Measure => write!(f, "measure"),
            Token::Reset => write!(f, "reset"),
            Token::Print => write!(f, "print"),
            Token::Ctrl => write!(f, "ctrl"),
            Token::NegCtrl => write!(f, "negctrl"),
            Token::Inv => write!(f, "inv"),
            Token::Pow => write!(f, "pow"),
            Token::GateU => write!(f, "U"),
            Token::GateX => write!(f, "X"),
            Token::GateY => write!(f, "Y"),
            Token::GateZ => write!(f, "Z"),
            Token::GateH => write!(f, "H"),
            Token::GateS => write!(f, "S"),
            Token::GateT => write!(f, "T"),
            Token::Qft => write!(f, "QFT"),
            Token::Iqft => write!(f, "IQFT"),
            Token::CModExp2 => write!(f, "CMODEXP2"),
            Token::Pi => write!(f, "pi"),
            Token::Tau => write!(f, "tau"),
            Token::Euler => write!(f, "euler"),
            Token::FloatLiteral(s) | Token::IntLiteral(s) | Token::Identifier(s) => {
                write!(f, "{s}")
            }
            Token::StringLiteral(s) => write!(f, "\"{s}\""),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Eq => write!(f, "="),
            Token::Arrow => write!(f, "->"),
            Token::At => write!(f, "@"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Semicolon => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Illegal(s) => write!(f, "{s}"),
        }
    }
}

/// A token with its span and line information.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
    /// 1-based line the token starts on.
    pub line: usize,
}

/// Streaming lexer over a source string.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Token>,
    line: usize,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a lexer positioned at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Token::lexer(source),
            line: 1,
            errors: Vec::new(),
        }
    }

    /// Return the next token, trivia included. `None` marks end of input.
    pub fn scan(&mut self) -> Option<SpannedToken> {
        let result = self.inner.next()?;
        let span = self.inner.span();
        let slice = self.inner.slice();
        let line = self.line;
        self.line += slice.matches('\n').count();

        let token = result.unwrap_or_else(|()| Token::Illegal(slice.to_string()));
        if let Token::Illegal(text) = &token {
            warn!(line, text = text.as_str(), "illegal character");
            self.errors.push(LexError::Illegal {
                line,
                text: text.clone(),
            });
        }

        Some(SpannedToken { token, span, line })
    }

    /// Return the next significant token, skipping whitespace and comments.
    pub fn tokenize(&mut self) -> Option<SpannedToken> {
        loop {
            let token = self.scan()?;
            if !token.token.is_trivia() {
                return Some(token);
            }
        }
    }

    /// Errors accumulated so far.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Consume the lexer, returning its accumulated errors.
    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }
}

impl Iterator for Lexer<'_> {
    type Item = SpannedToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenize()
    }
}

/// Tokenize a source string into its significant tokens.
pub fn tokenize(source: &str) -> (Vec<SpannedToken>, Vec<LexError>) {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.by_ref().collect();
    (tokens, lexer.into_errors())
}

/// Read a whole source from `reader`.
///
/// Read failures do not abort: whatever was read before the failure is
/// returned together with the accumulated errors.
pub fn read_source<R: BufRead>(mut reader: R) -> (String, Vec<LexError>) {
    let mut source = String::new();
    let mut errors = Vec::new();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => source.push_str(&line),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => {
                errors.push(LexError::Io(e));
                break;
            }
        }
    }
    (source, errors)
}
