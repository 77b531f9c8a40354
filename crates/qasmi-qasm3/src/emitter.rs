//! Canonical source rendering for AST nodes.
//!
//! Statements render on a single line; a program renders one statement per
//! line. Binary expressions get parentheses wherever the tree shape would
//! otherwise be lost, so printing then parsing is stable.

use std::fmt::{self, Display, Formatter};

use crate::ast::{
    ApplyStmt, ArrowStmt, AssignStmt, BinaryExpr, BlockStmt, CallExpr, ConstDecl, Decl, Expr,
    GateDecl, GenDecl, LitKind, MeasureExpr, Modifier, Program, Stmt, SubroutineDecl, TypeSpec,
    UnaryExpr, UnaryOp,
};

/// Write `items` separated by `", "`.
fn comma_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Write a string literal. Literals have no escapes: text containing `"`
/// is written with single quotes.
fn quoted(f: &mut Formatter<'_>, value: &str) -> fmt::Result {
    if value.contains('"') {
        write!(f, "'{value}'")
    } else {
        write!(f, "\"{value}\"")
    }
}

/// Write `modifiers` as `m1 @ m2 @ ` prefixes.
fn modifier_prefix(f: &mut Formatter<'_>, modifiers: &[Modifier]) -> fmt::Result {
    for modifier in modifiers {
        write!(f, "{modifier} @ ")?;
    }
    Ok(())
}

/// Write ` q0, q1` when `qargs` is non-empty.
fn qarg_suffix(f: &mut Formatter<'_>, qargs: &[Expr]) -> fmt::Result {
    if !qargs.is_empty() {
        write!(f, " ")?;
        comma_list(f, qargs)?;
    }
    Ok(())
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(expr) => write!(f, "{expr};"),
            Stmt::Decl(decl) => write!(f, "{decl}"),
            Stmt::Include(path) => {
                write!(f, "include ")?;
                quoted(f, path)?;
                write!(f, ";")
            }
            Stmt::Return(None) => write!(f, "return;"),
            Stmt::Return(Some(expr)) => write!(f, "return {expr};"),
            Stmt::Arrow(arrow) => write!(f, "{arrow}"),
            Stmt::Assign(assign) => write!(f, "{assign}"),
            Stmt::Reset(qargs) => {
                write!(f, "reset")?;
                qarg_suffix(f, qargs)?;
                write!(f, ";")
            }
            Stmt::Print(args) => {
                write!(f, "print")?;
                qarg_suffix(f, args)?;
                write!(f, ";")
            }
            Stmt::Apply(apply) => write!(f, "{apply}"),
            Stmt::Block(block) => write!(f, "{block}"),
        }
    }
}

impl Display for ArrowStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {};", self.left, self.right)
    }
}

impl Display for AssignStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {};", self.left, self.right)
    }
}

impl Display for ApplyStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        modifier_prefix(f, &self.modifiers)?;
        write!(f, "{}", self.kind.name())?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            comma_list(f, &self.params)?;
            write!(f, ")")?;
        }
        qarg_suffix(f, &self.qargs)?;
        write!(f, ";")
    }
}

impl Display for BlockStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for stmt in &self.stmts {
            write!(f, " {stmt}")?;
        }
        write!(f, " }}")
    }
}

impl Display for Decl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Version(version) => write!(f, "OPENQASM {version};"),
            Decl::Gen(decl) => write!(f, "{decl};"),
            Decl::Const(decl) => write!(f, "{decl}"),
            Decl::Gate(decl) => write!(f, "{decl}"),
            Decl::Subroutine(decl) => write!(f, "{decl}"),
        }
    }
}

impl Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if let Some(size) = &self.size {
            write!(f, "[{size}]")?;
        }
        Ok(())
    }
}

impl Display for GenDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

impl Display for ConstDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "const ")?;
        if let Some(ty) = &self.ty {
            write!(f, "{ty} ")?;
        }
        write!(f, "{} = {};", self.name, self.value)
    }
}

impl Display for GateDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "gate {}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            comma_list(f, &self.params)?;
            write!(f, ")")?;
        }
        write!(f, " ")?;
        comma_list(f, &self.qargs)?;
        write!(f, " {}", self.body)
    }
}

impl Display for SubroutineDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "def {}(", self.name)?;
        comma_list(f, &self.params)?;
        write!(f, ")")?;
        if !self.qargs.is_empty() {
            write!(f, " ")?;
            comma_list(f, &self.qargs)?;
        }
        if let Some(ret) = &self.ret {
            write!(f, " -> {ret}")?;
        }
        write!(f, " {}", self.body)
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if let Some(arg) = &self.arg {
            write!(f, "({arg})")?;
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{name}"),
            Expr::Index(index) => write!(f, "{}[{}]", index.name, index.index),
            Expr::Lit(lit) => match lit.kind {
                LitKind::Str => quoted(f, &lit.value),
                LitKind::Int | LitKind::Float => write!(f, "{}", lit.value),
            },
            Expr::Binary(binary) => write!(f, "{binary}"),
            Expr::Unary(unary) => write!(f, "{unary}"),
            Expr::Call(call) => write!(f, "{call}"),
            Expr::Measure(measure) => write!(f, "{measure}"),
            Expr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}

impl Display for BinaryExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let prec = self.op.precedence();
        operand(f, &self.left, |p| p < prec)?;
        write!(f, " {} ", self.op.symbol())?;
        // Left associative: an equal-precedence right operand needs parentheses.
        operand(f, &self.right, |p| p <= prec)
    }
}

impl Display for UnaryExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = match self.op {
            UnaryOp::Neg => "-",
            UnaryOp::Pos => "+",
        };
        write!(f, "{sign}")?;
        operand(f, &self.operand, |_| true)
    }
}

/// Write a binary operand, parenthesised when it is itself a binary
/// expression whose precedence satisfies `needs_parens`.
fn operand(f: &mut Formatter<'_>, expr: &Expr, needs_parens: impl Fn(u8) -> bool) -> fmt::Result {
    match expr {
        Expr::Binary(inner) if needs_parens(inner.op.precedence()) => write!(f, "({expr})"),
        _ => write!(f, "{expr}"),
    }
}

impl Display for CallExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        modifier_prefix(f, &self.modifiers)?;
        write!(f, "{}", self.name)?;
        if !self.params.is_empty() || self.qargs.is_empty() {
            write!(f, "(")?;
            comma_list(f, &self.params)?;
            write!(f, ")")?;
        }
        qarg_suffix(f, &self.qargs)
    }
}

impl Display for MeasureExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "measure")?;
        qarg_suffix(f, &self.qargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Builtin, TypeKind};

    #[test]
    fn test_string_quotes_survive_reparse() {
        let program = crate::parse(r#"include 'a"b.inc'; const s = 'say "hi"'; const t = "it's";"#)
            .unwrap();
        let text = program.to_string();
        assert_eq!(
            text,
            "include 'a\"b.inc';\nconst s = 'say \"hi\"';\nconst t = \"it's\";\n"
        );
        assert_eq!(crate::parse(&text).unwrap(), program);
    }

    #[test]
    fn test_register_declarations() {
        let qubits = Decl::Gen(GenDecl::new(
            TypeSpec::sized(TypeKind::Qubit, Expr::int(2)),
            "q",
        ));
        assert_eq!(qubits.to_string(), "qubit[2] q;");

        let bit = Decl::Gen(GenDecl::new(TypeSpec::new(TypeKind::Bit), "c"));
        assert_eq!(bit.to_string(), "bit c;");
    }

    #[test]
    fn test_apply_with_modifiers() {
        let apply = ApplyStmt {
            kind: Builtin::U,
            modifiers: vec![Modifier::ctrl(), Modifier::pow(Expr::int(2))],
            params: vec![Expr::ident("pi"), Expr::int(0), Expr::ident("pi")],
            qargs: vec![Expr::ident("c"), Expr::index("q", Expr::int(0))],
        };
        assert_eq!(apply.to_string(), "ctrl @ pow(2) @ U(pi, 0, pi) c, q[0];");
    }

    #[test]
    fn test_binary_parenthesisation() {
        let sum = Expr::binary(Expr::int(1), BinOp::Add, Expr::int(2));
        let product = Expr::binary(sum.clone(), BinOp::Mul, Expr::int(3));
        assert_eq!(product.to_string(), "(1 + 2) * 3");

        let nested = Expr::binary(Expr::int(1), BinOp::Sub, sum);
        assert_eq!(nested.to_string(), "1 - (1 + 2)");

        let negated = Expr::neg(Expr::binary(Expr::int(1), BinOp::Add, Expr::int(2)));
        assert_eq!(negated.to_string(), "-(1 + 2)");
    }

    #[test]
    fn test_call_rendering() {
        let gate = CallExpr::new("bell", vec![], vec![Expr::ident("a"), Expr::ident("b")]);
        assert_eq!(gate.to_string(), "bell a, b");

        let subroutine = CallExpr::new("f", vec![Expr::ident("q")], vec![]);
        assert_eq!(subroutine.to_string(), "f(q)");

        let empty = CallExpr::new("g", vec![], vec![]);
        assert_eq!(empty.to_string(), "g()");
    }

    #[test]
    fn test_subroutine_rendering() {
        let def = SubroutineDecl {
            name: "xm".into(),
            params: vec![
                GenDecl::new(TypeSpec::new(TypeKind::Qubit), "q"),
                GenDecl::new(TypeSpec::sized(TypeKind::Float, Expr::int(32)), "theta"),
            ],
            qargs: vec![],
            ret: Some(TypeSpec::new(TypeKind::Bit)),
            body: BlockStmt::new(vec![Stmt::Return(Some(Expr::Measure(MeasureExpr {
                qargs: vec![Expr::ident("q")],
            })))]),
        };
        assert_eq!(
            Decl::Subroutine(def).to_string(),
            "def xm(qubit q, float[32] theta) -> bit { return measure q; }"
        );
    }

    #[test]
    fn test_gate_rendering() {
        let gate = GateDecl {
            name: "rot".into(),
            params: vec!["theta".into()],
            qargs: vec!["q".into()],
            body: BlockStmt::default(),
        };
        assert_eq!(Decl::Gate(gate).to_string(), "gate rot(theta) q { }");
    }

    #[test]
    fn test_misc_statements() {
        assert_eq!(Stmt::Print(vec![]).to_string(), "print;");
        assert_eq!(Stmt::Return(None).to_string(), "return;");
        assert_eq!(
            Stmt::Include("stdgates.inc".into()).to_string(),
            "include \"stdgates.inc\";"
        );
        assert_eq!(
            Stmt::Expr(Expr::Measure(MeasureExpr { qargs: vec![] })).to_string(),
            "measure;"
        );
    }
}
