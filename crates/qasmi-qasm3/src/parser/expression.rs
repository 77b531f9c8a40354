//! Expression parsing.

use super::Parser;
use crate::ast::{BasicLit, BinOp, CallExpr, Expr, LitKind, MeasureExpr, UnaryExpr, UnaryOp};
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser {
    /// Parse an expression.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_binary_expr(0)
    }

    /// Parse the value side of an assignment or return: a measurement or an
    /// ordinary expression.
    pub(super) fn parse_value(&mut self) -> ParseResult<Expr> {
        if self.check(&Token::Measure) {
            self.parse_measure_expr()
        } else {
            self.parse_expression()
        }
    }

    /// Parse `measure [qargs]`.
    pub(super) fn parse_measure_expr(&mut self) -> ParseResult<Expr> {
        self.expect(Token::Measure)?;
        let qargs = if self.at_qarg_list_end() {
            Vec::new()
        } else {
            self.parse_qarg_list()?
        };
        Ok(Expr::Measure(MeasureExpr { qargs }))
    }

    /// Parse binary expression with precedence climbing.
    fn parse_binary_expr(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        while let Some(op) = self.peek_binary_op() {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.advance(); // consume operator

            let right = self.parse_binary_expr(prec + 1)?;
            left = Expr::binary(left, op, right);
        }

        Ok(left)
    }

    /// Parse unary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        let op = if self.consume(&Token::Minus) {
            UnaryOp::Neg
        } else if self.consume(&Token::Plus) {
            UnaryOp::Pos
        } else {
            return self.parse_primary_expr();
        };
        let operand = self.parse_unary_expr()?;
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        }))
    }

    /// Parse primary expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.unexpected("expression"));
        };

        match token {
            Token::IntLiteral(value) => {
                self.advance();
                Ok(Expr::Lit(BasicLit {
                    kind: LitKind::Int,
                    value,
                }))
            }
            Token::FloatLiteral(value) => {
                self.advance();
                Ok(Expr::Lit(BasicLit {
                    kind: LitKind::Float,
                    value,
                }))
            }
            Token::StringLiteral(value) => {
                self.advance();
                Ok(Expr::Lit(BasicLit::string(value)))
            }
            Token::Pi => {
                self.advance();
                Ok(Expr::ident("pi"))
            }
            Token::Tau => {
                self.advance();
                Ok(Expr::ident("tau"))
            }
            Token::Euler => {
                self.advance();
                Ok(Expr::ident("euler"))
            }
            Token::Identifier(name) => match self.peek_nth(1) {
                Some(Token::LParen) => {
                    self.advance();
                    let params = self.parse_paren_list()?;
                    let qargs = self.parse_call_qargs()?;
                    Ok(Expr::Call(CallExpr::new(name, params, qargs)))
                }
                // `f q`: a call without parameters.
                Some(Token::Identifier(_)) => {
                    self.advance();
                    let qargs = self.parse_call_qargs()?;
                    Ok(Expr::Call(CallExpr::new(name, Vec::new(), qargs)))
                }
                _ => self.parse_qarg(),
            },
            Token::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(Token::RParen)?;
                Ok(Expr::Paren(Box::new(expr)))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Peek at binary operator.
    fn peek_binary_op(&self) -> Option<BinOp> {
        match self.peek()? {
            Token::Plus => Some(BinOp::Add),
            Token::Minus => Some(BinOp::Sub),
            Token::Star => Some(BinOp::Mul),
            Token::Slash => Some(BinOp::Div),
            Token::Percent => Some(BinOp::Mod),
            _ => None,
        }
    }

    /// Parse `( expr, ... )`, possibly empty.
    pub(super) fn parse_paren_list(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Token::LParen)?;
        let exprs = self.parse_expression_list()?;
        self.expect(Token::RParen)?;
        Ok(exprs)
    }

    /// Parse expression list.
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expr>> {
        if self.check(&Token::RParen) {
            return Ok(vec![]);
        }
        let mut exprs = vec![self.parse_expression()?];
        while self.consume(&Token::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Parse a register reference: `q` or `q[expr]`.
    pub(super) fn parse_qarg(&mut self) -> ParseResult<Expr> {
        let name = self.parse_identifier()?;
        if self.consume(&Token::LBracket) {
            let index = self.parse_expression()?;
            self.expect(Token::RBracket)?;
            Ok(Expr::index(name, index))
        } else {
            Ok(Expr::Ident(name))
        }
    }

    /// Parse a non-empty, comma-separated list of register references.
    pub(super) fn parse_qarg_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut qargs = vec![self.parse_qarg()?];
        while self.consume(&Token::Comma) {
            qargs.push(self.parse_qarg()?);
        }
        Ok(qargs)
    }

    /// Qubit arguments after a call in value position. The list takes every
    /// comma-separated register that follows.
    fn parse_call_qargs(&mut self) -> ParseResult<Vec<Expr>> {
        if matches!(self.peek(), Some(Token::Identifier(_))) {
            self.parse_qarg_list()
        } else {
            Ok(Vec::new())
        }
    }

    /// True where an optional qarg list may be omitted.
    pub(super) fn at_qarg_list_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(Token::Semicolon | Token::Arrow | Token::RBrace)
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expr, Stmt};
    use crate::parser::parse;

    fn expr(source: &str) -> Expr {
        let program = parse(&format!("const x = {source};")).unwrap();
        match &program.statements[0] {
            Stmt::Decl(crate::ast::Decl::Const(decl)) => decl.value.clone(),
            other => panic!("expected const declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let e = expr("1 + 2 * 3");
        let Expr::Binary(sum) = e else {
            panic!("expected binary");
        };
        assert_eq!(sum.op, BinOp::Add);
        assert_eq!(*sum.left, Expr::int(1));
        assert!(matches!(*sum.right, Expr::Binary(ref p) if p.op == BinOp::Mul));
    }

    #[test]
    fn test_left_associativity() {
        let e = expr("8 - 4 - 2");
        let Expr::Binary(outer) = e else {
            panic!("expected binary");
        };
        assert!(matches!(*outer.left, Expr::Binary(ref inner) if inner.op == BinOp::Sub));
        assert_eq!(*outer.right, Expr::int(2));
    }

    #[test]
    fn test_unary_and_parens() {
        assert_eq!(expr("-3"), Expr::neg(Expr::int(3)));
        assert_eq!(expr("-(1 + 2)").to_string(), "-(1 + 2)");
        assert_eq!(expr("(1 + 2) % 4").to_string(), "(1 + 2) % 4");
        assert_eq!(expr("+pi / 2").to_string(), "+pi / 2");
    }

    #[test]
    fn test_literals_keep_source_text() {
        assert_eq!(expr("7.").to_string(), "7.");
        assert_eq!(expr("2e3").to_string(), "2e3");
        assert_eq!(expr("\"text\"").to_string(), "\"text\"");
    }

    #[test]
    fn test_call_with_qargs_as_value() {
        let program = parse("c = f(1) q, r[0];\nreturn g q;").unwrap();
        let Stmt::Assign(assign) = &program.statements[0] else {
            panic!("expected assignment");
        };
        let Expr::Call(call) = &assign.right else {
            panic!("expected call");
        };
        assert_eq!(call.name, "f");
        assert_eq!(call.params, vec![Expr::int(1)]);
        assert_eq!(call.qargs, vec![Expr::ident("q"), Expr::index("r", Expr::int(0))]);

        let Stmt::Return(Some(Expr::Call(call))) = &program.statements[1] else {
            panic!("expected return of a call");
        };
        assert!(call.params.is_empty());
        assert_eq!(call.qargs, vec![Expr::ident("q")]);
        assert_eq!(program.to_string(), "c = f(1) q, r[0];\nreturn g q;\n");
    }

    #[test]
    fn test_index_and_call() {
        assert_eq!(expr("q[-1]"), Expr::index("q", Expr::neg(Expr::int(1))));
        assert_eq!(expr("f(q, 2)").to_string(), "f(q, 2)");
        assert_eq!(expr("f()").to_string(), "f()");
    }
}
