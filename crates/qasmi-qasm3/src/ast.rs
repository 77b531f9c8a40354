//! Abstract Syntax Tree for the `OpenQASM` 3 subset.
//!
//! Every node renders back to source text through `Display` (see the emitter
//! module); `parse(node.to_string())` yields a node that prints identically.

use serde::{Deserialize, Serialize};

/// A complete program.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Statements in source order. A version declaration, when present, is first.
    pub statements: Vec<Stmt>,
}

impl Program {
    /// The declared `OPENQASM` version, if any.
    pub fn version(&self) -> Option<&str> {
        match self.statements.first() {
            Some(Stmt::Decl(Decl::Version(v))) => Some(v),
            _ => None,
        }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Expression statement: a gate/subroutine call or a measurement.
    Expr(Expr),
    /// Declaration.
    Decl(Decl),
    /// `include "file";`
    Include(String),
    /// `return expr;` or `return;`
    Return(Option<Expr>),
    /// `expr -> target;`
    Arrow(ArrowStmt),
    /// `target = expr;`
    Assign(AssignStmt),
    /// `reset q, r;`
    Reset(Vec<Expr>),
    /// `print q, c;` or `print;`
    Print(Vec<Expr>),
    /// Built-in gate application.
    Apply(ApplyStmt),
    /// `{ ... }`
    Block(BlockStmt),
}

/// `expr -> target;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowStmt {
    pub left: Expr,
    pub right: Expr,
}

/// `target = expr;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    pub left: Expr,
    pub right: Expr,
}

/// Application of a built-in gate, e.g. `ctrl @ U(pi, 0, pi) c, t;`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyStmt {
    pub kind: Builtin,
    pub modifiers: Vec<Modifier>,
    pub params: Vec<Expr>,
    pub qargs: Vec<Expr>,
}

/// Built-in gates that have their own tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Builtin {
    U,
    X,
    Y,
    Z,
    H,
    S,
    T,
    Qft,
    Iqft,
    CModExp2,
}

impl Builtin {
    /// Source spelling.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::U => "U",
            Builtin::X => "X",
            Builtin::Y => "Y",
            Builtin::Z => "Z",
            Builtin::H => "H",
            Builtin::S => "S",
            Builtin::T => "T",
            Builtin::Qft => "QFT",
            Builtin::Iqft => "IQFT",
            Builtin::CModExp2 => "CMODEXP2",
        }
    }
}

/// An ordered list of statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// The inverse block: statements in reverse order, each gate application
    /// tagged with a trailing `inv` modifier.
    pub fn inv(&self) -> BlockStmt {
        let stmts = self
            .stmts
            .iter()
            .rev()
            .map(|stmt| match stmt {
                Stmt::Block(block) => Stmt::Block(block.inv()),
                other => rewrite_gate(other, |modifiers, _| modifiers.push(Modifier::inv())),
            })
            .collect();
        BlockStmt { stmts }
    }

    /// The block repeated `n` times, in original order.
    pub fn pow(&self, n: usize) -> BlockStmt {
        if self.stmts.is_empty() {
            return BlockStmt::default();
        }
        let stmts = (0..n).flat_map(|_| self.stmts.iter().cloned()).collect();
        BlockStmt { stmts }
    }

    /// Prepend `modifier` and the leading `qargs` to every gate application
    /// in the block. Other statements pass through unchanged.
    pub fn add(&self, modifier: &Modifier, qargs: &[Expr]) -> BlockStmt {
        let stmts = self
            .stmts
            .iter()
            .map(|stmt| match stmt {
                Stmt::Block(block) => Stmt::Block(block.add(modifier, qargs)),
                other => rewrite_gate(other, |modifiers, targets| {
                    modifiers.insert(0, modifier.clone());
                    targets.splice(0..0, qargs.iter().cloned());
                }),
            })
            .collect();
        BlockStmt { stmts }
    }
}

/// Clone `stmt`, letting `f` edit the modifiers and qargs when it is a gate
/// application (built-in apply or call statement).
fn rewrite_gate(stmt: &Stmt, f: impl FnOnce(&mut Vec<Modifier>, &mut Vec<Expr>)) -> Stmt {
    match stmt {
        Stmt::Apply(apply) => {
            let mut apply = apply.clone();
            f(&mut apply.modifiers, &mut apply.qargs);
            Stmt::Apply(apply)
        }
        Stmt::Expr(Expr::Call(call)) => {
            let mut call = call.clone();
            f(&mut call.modifiers, &mut call.qargs);
            Stmt::Expr(Expr::Call(call))
        }
        other => other.clone(),
    }
}

/// A declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    /// `OPENQASM 3.0;`
    Version(String),
    /// `qubit[2] q;`, `bit c;`
    Gen(GenDecl),
    /// `const n = 3;`
    Const(ConstDecl),
    /// `gate name(params) qargs { ... }`
    Gate(GateDecl),
    /// `def name(params) -> type { ... }`
    Subroutine(SubroutineDecl),
}

impl Decl {
    /// The declared name. Version declarations have none.
    pub fn ident(&self) -> Option<&str> {
        match self {
            Decl::Version(_) => None,
            Decl::Gen(d) => Some(&d.name),
            Decl::Const(d) => Some(&d.name),
            Decl::Gate(d) => Some(&d.name),
            Decl::Subroutine(d) => Some(&d.name),
        }
    }
}

/// Scalar and register types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Qubit,
    Bit,
    Int,
    Uint,
    Float,
    Angle,
}

impl TypeKind {
    pub fn name(self) -> &'static str {
        match self {
            TypeKind::Qubit => "qubit",
            TypeKind::Bit => "bit",
            TypeKind::Int => "int",
            TypeKind::Uint => "uint",
            TypeKind::Float => "float",
            TypeKind::Angle => "angle",
        }
    }

    /// Classical scalar types bound as constants rather than registers.
    pub fn is_scalar(self) -> bool {
        !matches!(self, TypeKind::Qubit | TypeKind::Bit)
    }
}

/// A type, optionally sized: `qubit`, `bit[4]`, `float[64]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub kind: TypeKind,
    pub size: Option<Box<Expr>>,
}

impl TypeSpec {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind, size: None }
    }

    pub fn sized(kind: TypeKind, size: Expr) -> Self {
        Self {
            kind,
            size: Some(Box::new(size)),
        }
    }
}

/// Register or typed parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub ty: TypeSpec,
    pub name: String,
}

impl GenDecl {
    pub fn new(ty: TypeSpec, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.ty.kind
    }

    /// Number of qubits or bits the declaration allocates: 1 when unsized,
    /// the literal size otherwise. `None` when the size is symbolic
    /// (`bit[n] c`) or not a non-negative integer literal.
    pub fn size(&self) -> Option<usize> {
        match self.ty.size.as_deref() {
            None => Some(1),
            Some(Expr::Lit(lit)) => lit.as_int().and_then(|v| usize::try_from(v).ok()),
            Some(_) => None,
        }
    }
}

/// `const [type] name = value;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub ty: Option<TypeSpec>,
    pub name: String,
    pub value: Expr,
}

/// User-defined gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDecl {
    pub name: String,
    /// Classical parameter names.
    pub params: Vec<String>,
    /// Qubit argument names.
    pub qargs: Vec<String>,
    pub body: BlockStmt,
}

/// Subroutine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineDecl {
    pub name: String,
    /// Typed parameters from the parenthesised signature.
    pub params: Vec<GenDecl>,
    /// Extra untyped qubit arguments following the signature.
    pub qargs: Vec<String>,
    pub ret: Option<TypeSpec>,
    pub body: BlockStmt,
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `q`
    Ident(String),
    /// `q[1]`, `q[-1]`
    Index(IndexExpr),
    /// `3`, `1.5`, `"file"`
    Lit(BasicLit),
    /// `a + b`
    Binary(BinaryExpr),
    /// `-a`
    Unary(UnaryExpr),
    /// Gate or subroutine invocation.
    Call(CallExpr),
    /// `measure q`
    Measure(MeasureExpr),
    /// `(expr)`
    Paren(Box<Expr>),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn index(name: impl Into<String>, index: Expr) -> Self {
        Expr::Index(IndexExpr {
            name: name.into(),
            index: Box::new(index),
        })
    }

    pub fn int(value: i64) -> Self {
        Expr::Lit(BasicLit::int(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::Lit(BasicLit::float(value))
    }

    pub fn binary(left: Expr, op: BinOp, right: Expr) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn neg(operand: Expr) -> Self {
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        })
    }

    /// The identifier this expression names: the register of an identifier
    /// or index expression, or the text of a literal.
    pub fn name(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            Expr::Index(index) => Some(&index.name),
            Expr::Lit(lit) => Some(&lit.value),
            _ => None,
        }
    }
}

/// `name[index]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub name: String,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Str,
}

/// A literal, kept as its source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String,
}

impl BasicLit {
    pub fn int(value: i64) -> Self {
        Self {
            kind: LitKind::Int,
            value: value.to_string(),
        }
    }

    /// Float literal. `value` is rendered with `{:?}` so it always keeps a
    /// decimal point.
    pub fn float(value: f64) -> Self {
        Self {
            kind: LitKind::Float,
            value: format!("{value:?}"),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self {
            kind: LitKind::Str,
            value: value.into(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.kind {
            LitKind::Int => self.value.parse().ok(),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self.kind {
            LitKind::Int => self.as_int().map(|v| v as f64),
            LitKind::Float => self.value.parse().ok(),
            LitKind::Str => None,
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    /// Binding strength; larger binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Add | BinOp::Sub => 1,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Pos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

/// `modifiers @ name(params) qargs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub name: String,
    pub modifiers: Vec<Modifier>,
    pub params: Vec<Expr>,
    pub qargs: Vec<Expr>,
}

impl CallExpr {
    pub fn new(name: impl Into<String>, params: Vec<Expr>, qargs: Vec<Expr>) -> Self {
        Self {
            name: name.into(),
            modifiers: Vec::new(),
            params,
            qargs,
        }
    }
}

/// `measure qargs`; no qargs means every qubit in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureExpr {
    pub qargs: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    Ctrl,
    NegCtrl,
    Inv,
    Pow,
}

impl ModifierKind {
    pub fn name(self) -> &'static str {
        match self {
            ModifierKind::Ctrl => "ctrl",
            ModifierKind::NegCtrl => "negctrl",
            ModifierKind::Inv => "inv",
            ModifierKind::Pow => "pow",
        }
    }
}

/// Gate modifier, e.g. `ctrl(2)` or `inv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub kind: ModifierKind,
    pub arg: Option<Box<Expr>>,
}

impl Modifier {
    pub fn new(kind: ModifierKind, arg: Option<Expr>) -> Self {
        Self {
            kind,
            arg: arg.map(Box::new),
        }
    }

    pub fn ctrl() -> Self {
        Self::new(ModifierKind::Ctrl, None)
    }

    pub fn negctrl() -> Self {
        Self::new(ModifierKind::NegCtrl, None)
    }

    pub fn inv() -> Self {
        Self::new(ModifierKind::Inv, None)
    }

    pub fn pow(exponent: Expr) -> Self {
        Self::new(ModifierKind::Pow, Some(exponent))
    }

    pub fn is_control(&self) -> bool {
        matches!(self.kind, ModifierKind::Ctrl | ModifierKind::NegCtrl)
    }
}
