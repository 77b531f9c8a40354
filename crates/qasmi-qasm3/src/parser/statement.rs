//! Statement and declaration parsing.

use super::Parser;
use crate::ast::{
    ApplyStmt, ArrowStmt, AssignStmt, BlockStmt, Builtin, CallExpr, ConstDecl, Decl, Expr,
    GateDecl, GenDecl, Modifier, ModifierKind, Stmt, SubroutineDecl, TypeKind, TypeSpec,
};
use crate::error::{ParseError, ParseResult};
use crate::lexer::Token;

impl Parser {
    /// Parse a statement.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("statement"));
        };

        match token {
            Token::OpenQasm => self.parse_version(),
            Token::Include => self.parse_include(),
            Token::Const => self.parse_const_decl(),
            Token::Gate => self.parse_gate_decl(),
            Token::Def => self.parse_subroutine_decl(),
            Token::Return => self.parse_return(),
            Token::Reset => self.parse_reset(),
            Token::Print => self.parse_print(),
            Token::Measure => self.parse_measure(),
            Token::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            t if t.is_type() => self.parse_gen_decl(),
            Token::Identifier(_) if self.starts_assignment() => self.parse_assignment(),
            t if t.is_modifier() || builtin(&t).is_some() || matches!(t, Token::Identifier(_)) => {
                self.parse_gate_statement()
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// Parse `OPENQASM <version>;`.
    fn parse_version(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::OpenQasm)?;
        let line = self.line();
        let version = match self.peek() {
            Some(Token::FloatLiteral(v) | Token::IntLiteral(v)) => v.clone(),
            Some(other) => {
                return Err(ParseError::InvalidVersion {
                    line,
                    found: other.to_string(),
                });
            }
            None => return Err(self.unexpected("version number")),
        };
        self.advance();
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Decl(Decl::Version(version)))
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Include)?;
        let path = match self.peek() {
            Some(Token::StringLiteral(s)) => s.clone(),
            _ => return Err(self.unexpected("string literal")),
        };
        self.advance();
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Include(path))
    }

    /// Parse a type, optionally sized: `qubit`, `bit[n]`, `float[64]`.
    fn parse_type(&mut self) -> ParseResult<TypeSpec> {
        let kind = match self.peek() {
            Some(Token::Qubit) => TypeKind::Qubit,
            Some(Token::Bit) => TypeKind::Bit,
            Some(Token::Int) => TypeKind::Int,
            Some(Token::Uint) => TypeKind::Uint,
            Some(Token::Float) => TypeKind::Float,
            Some(Token::Angle) => TypeKind::Angle,
            _ => return Err(self.unexpected("type")),
        };
        self.advance();

        if self.consume(&Token::LBracket) {
            let size = self.parse_expression()?;
            self.expect(Token::RBracket)?;
            Ok(TypeSpec::sized(kind, size))
        } else {
            Ok(TypeSpec::new(kind))
        }
    }

    /// Parse `type name`.
    fn parse_typed_name(&mut self) -> ParseResult<GenDecl> {
        let ty = self.parse_type()?;
        let name = self.parse_identifier()?;
        Ok(GenDecl::new(ty, name))
    }

    /// Parse register declaration: `qubit[2] q;`.
    fn parse_gen_decl(&mut self) -> ParseResult<Stmt> {
        let decl = self.parse_typed_name()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Decl(Decl::Gen(decl)))
    }

    /// Parse `const [type] name = expr;`.
    fn parse_const_decl(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Const)?;
        let ty = match self.peek() {
            Some(t) if t.is_type() => Some(self.parse_type()?),
            _ => None,
        };
        let name = self.parse_identifier()?;
        self.expect(Token::Eq)?;
        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Decl(Decl::Const(ConstDecl { ty, name, value })))
    }

    /// Parse gate definition: `gate name(params) qargs { body }`.
    fn parse_gate_decl(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Gate)?;
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let params = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            params
        } else {
            vec![]
        };

        let qargs = self.parse_identifier_list()?;
        let body = self.parse_block()?;

        Ok(Stmt::Decl(Decl::Gate(GateDecl {
            name,
            params,
            qargs,
            body,
        })))
    }

    /// Parse subroutine definition: `def name(type a, ...) qargs -> type { body }`.
    fn parse_subroutine_decl(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Def)?;
        let name = self.parse_identifier()?;

        self.expect(Token::LParen)?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            params.push(self.parse_typed_name()?);
            while self.consume(&Token::Comma) {
                params.push(self.parse_typed_name()?);
            }
        }
        self.expect(Token::RParen)?;

        let qargs = if matches!(self.peek(), Some(Token::Identifier(_))) {
            self.parse_identifier_list()?
        } else {
            vec![]
        };

        let ret = if self.consume(&Token::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;

        Ok(Stmt::Decl(Decl::Subroutine(SubroutineDecl {
            name,
            params,
            qargs,
            ret,
            body,
        })))
    }

    /// Parse `{ stmt* }`.
    pub(super) fn parse_block(&mut self) -> ParseResult<BlockStmt> {
        self.expect(Token::LBrace)?;
        let stmts = self.parse_statements(false);
        self.expect(Token::RBrace)?;
        Ok(BlockStmt::new(stmts))
    }

    /// Parse `return [value];`.
    fn parse_return(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Return)?;
        let value = if self.check(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_value()?)
        };
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Return(value))
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Reset)?;
        let qargs = self.parse_qarg_list()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Reset(qargs))
    }

    /// Parse `print [qargs];`.
    fn parse_print(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Print)?;
        let args = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qarg_list()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Print(args))
    }

    /// Parse `measure q;` or `measure q -> c;`.
    fn parse_measure(&mut self) -> ParseResult<Stmt> {
        let measure = self.parse_measure_expr()?;
        self.finish_expr_statement(measure)
    }

    /// Finish a statement that starts with a value: `expr;` or `expr -> target;`.
    fn finish_expr_statement(&mut self, left: Expr) -> ParseResult<Stmt> {
        let stmt = if self.consume(&Token::Arrow) {
            let right = self.parse_qarg()?;
            Stmt::Arrow(ArrowStmt { left, right })
        } else {
            Stmt::Expr(left)
        };
        self.expect(Token::Semicolon)?;
        Ok(stmt)
    }

    /// `name = ...` or `name[i] = ...`.
    fn starts_assignment(&self) -> bool {
        matches!(self.peek_nth(1), Some(Token::Eq | Token::LBracket))
    }

    /// Parse `target = value;`.
    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let left = self.parse_qarg()?;
        self.expect(Token::Eq)?;
        let right = self.parse_value()?;
        self.expect(Token::Semicolon)?;
        Ok(Stmt::Assign(AssignStmt { left, right }))
    }

    /// Parse a gate application: `modifiers @ name(params) qargs;`.
    ///
    /// Built-in gate tokens become [`Stmt::Apply`]; identifiers become call
    /// expressions resolved at evaluation time.
    fn parse_gate_statement(&mut self) -> ParseResult<Stmt> {
        let modifiers = self.parse_modifiers()?;

        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("gate name"));
        };

        if let Some(kind) = builtin(&token) {
            self.advance();
            let params = if self.check(&Token::LParen) {
                self.parse_paren_list()?
            } else {
                vec![]
            };
            let qargs = self.parse_qarg_list()?;
            self.expect(Token::Semicolon)?;
            return Ok(Stmt::Apply(ApplyStmt {
                kind,
                modifiers,
                params,
                qargs,
            }));
        }

        let name = self.parse_identifier()?;
        let params = if self.check(&Token::LParen) {
            self.parse_paren_list()?
        } else {
            vec![]
        };
        let qargs = if self.at_qarg_list_end() {
            vec![]
        } else {
            self.parse_qarg_list()?
        };

        let call = Expr::Call(CallExpr {
            name,
            modifiers,
            params,
            qargs,
        });
        self.finish_expr_statement(call)
    }

    /// Parse `modifier @` prefixes.
    fn parse_modifiers(&mut self) -> ParseResult<Vec<Modifier>> {
        let mut modifiers = Vec::new();
        loop {
            let kind = match self.peek() {
                Some(Token::Ctrl) => ModifierKind::Ctrl,
                Some(Token::NegCtrl) => ModifierKind::NegCtrl,
                Some(Token::Inv) => ModifierKind::Inv,
                Some(Token::Pow) => ModifierKind::Pow,
                _ => return Ok(modifiers),
            };
            self.advance();

            let arg = if self.consume(&Token::LParen) {
                let arg = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Some(arg)
            } else if kind == ModifierKind::Pow {
                return Err(self.unexpected("'(' after pow"));
            } else {
                None
            };

            self.expect(Token::At)?;
            modifiers.push(Modifier::new(kind, arg));
        }
    }
}

/// The built-in gate a token names, if any.
fn builtin(token: &Token) -> Option<Builtin> {
    match token {
        Token::GateU => Some(Builtin::U),
        Token::GateX => Some(Builtin::X),
        Token::GateY => Some(Builtin::Y),
        Token::GateZ => Some(Builtin::Z),
        Token::GateH => Some(Builtin::H),
        Token::GateS => Some(Builtin::S),
        Token::GateT => Some(Builtin::T),
        Token::Qft => Some(Builtin::Qft),
        Token::Iqft => Some(Builtin::Iqft),
        Token::CModExp2 => Some(Builtin::CModExp2),
        _ => None,
    }
}
