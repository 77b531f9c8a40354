//! Lexically nested scopes.
//!
//! The root scope owns global definitions. A child scope is created for each
//! gate or subroutine call: it starts with empty qubit and bit tables and
//! reads constants and definitions through its parent.
//!
//! | Table | Lookup |
//! |-------|--------|
//! | qubit registers | current scope only |
//! | bit registers | current scope only |
//! | constants | current scope, then outer scopes |
//! | gate and subroutine definitions | root scope |

use std::f64::consts::{E, PI, TAU};
use std::rc::Rc;

use qasmi_hal::QubitId;
use qasmi_qasm3::syntax::{Expr, GateDecl, Modifier, SubroutineDecl};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{EvalError, EvalResult};
use crate::object::{Const, Value};

/// Resolve a possibly negative index against a register of `len` elements.
/// `-1` is the last element; anything outside `[-len, len)` is `None`.
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { index + len } else { index };
    if (0..len).contains(&index) {
        usize::try_from(index).ok()
    } else {
        None
    }
}

/// Named registers in registration order.
#[derive(Debug, Clone)]
pub struct RegisterTable<T> {
    order: Vec<String>,
    registers: FxHashMap<String, Vec<T>>,
}

impl<T> Default for RegisterTable<T> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            registers: FxHashMap::default(),
        }
    }
}

impl<T: Clone> RegisterTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`. Re-adding a name replaces its values and keeps its
    /// original position.
    pub fn add(&mut self, name: impl Into<String>, values: Vec<T>) {
        let name = name.into();
        if !self.registers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.registers.insert(name, values);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registers.contains_key(name)
    }

    /// The whole register.
    pub fn register(&self, name: &str) -> Option<&[T]> {
        self.registers.get(name).map(Vec::as_slice)
    }

    pub fn register_mut(&mut self, name: &str) -> Option<&mut Vec<T>> {
        self.registers.get_mut(name)
    }

    /// The whole register, or the one element at `index`.
    pub fn get(&self, name: &str, index: Option<i64>) -> EvalResult<Vec<T>> {
        let register = self
            .register(name)
            .ok_or_else(|| EvalError::UndefinedIdentifier(name.to_string()))?;
        match index {
            None => Ok(register.to_vec()),
            Some(i) => {
                let at = normalize_index(i, register.len()).ok_or_else(|| {
                    EvalError::IndexOutOfRange {
                        register: name.to_string(),
                        index: i,
                        size: register.len(),
                    }
                })?;
                Ok(vec![register[at].clone()])
            }
        }
    }

    /// Every register concatenated in registration order.
    pub fn all(&self) -> Vec<T> {
        self.iter().flat_map(|(_, r)| r.iter().cloned()).collect()
    }

    /// `(name, values)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.registers.get(name).map(|r| (name.as_str(), r.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One scope in the environment chain.
#[derive(Debug)]
pub struct Environ<'a> {
    outer: Option<&'a Environ<'a>>,
    pub qubit: RegisterTable<QubitId>,
    pub bit: RegisterTable<u8>,
    consts: FxHashMap<String, Const>,
    /// Scalars declared without `const`; these may be reassigned.
    variables: FxHashSet<String>,
    gates: FxHashMap<String, Rc<GateDecl>>,
    subroutines: FxHashMap<String, Rc<SubroutineDecl>>,
    /// Definitions whose bodies are being evaluated, outermost first.
    decls: Vec<String>,
    /// Modifiers the current call was invoked with.
    modifiers: Vec<Modifier>,
}

impl Environ<'static> {
    /// A root scope with the built-in constants bound.
    pub fn new() -> Self {
        let mut env = Self::empty(None);
        for (names, value) in [
            (["pi", "π"], PI),
            (["tau", "τ"], TAU),
            (["euler", "ℇ"], E),
        ] {
            for name in names {
                env.consts.insert(name.to_string(), Const::Float(value));
            }
        }
        env
    }
}

impl Default for Environ<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Environ<'a> {
    fn empty(outer: Option<&'a Environ<'a>>) -> Self {
        Self {
            outer,
            qubit: RegisterTable::new(),
            bit: RegisterTable::new(),
            consts: FxHashMap::default(),
            variables: FxHashSet::default(),
            gates: FxHashMap::default(),
            subroutines: FxHashMap::default(),
            decls: Vec::new(),
            modifiers: Vec::new(),
        }
    }

    /// A child scope for evaluating the body of `decl`.
    pub fn enclosed(outer: &'a Environ<'a>, decl: &str, modifiers: Vec<Modifier>) -> Self {
        let mut env = Self::empty(Some(outer));
        env.decls = outer.decls.clone();
        env.decls.push(decl.to_string());
        env.modifiers = modifiers;
        env
    }

    /// True for the root scope.
    pub fn is_global(&self) -> bool {
        self.outer.is_none()
    }

    /// Definitions being evaluated, outermost first.
    pub fn decls(&self) -> &[String] {
        &self.decls
    }

    /// Number of nested calls this scope sits in.
    pub fn depth(&self) -> usize {
        self.decls.len()
    }

    /// Modifiers of the call this scope evaluates.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    fn root(&self) -> &Environ<'a> {
        let mut env = self;
        while let Some(outer) = env.outer {
            env = outer;
        }
        env
    }

    /// Bind a constant in this scope.
    pub fn set_const(&mut self, name: impl Into<String>, value: Const) {
        let name = name.into();
        self.variables.remove(&name);
        self.consts.insert(name, value);
    }

    /// Declare or assign a reassignable scalar in this scope.
    pub fn set_variable(&mut self, name: &str, value: Const) -> EvalResult<()> {
        if self.consts.contains_key(name) && !self.variables.contains(name) {
            return Err(EvalError::AssignToConst(name.to_string()));
        }
        self.variables.insert(name.to_string());
        self.consts.insert(name.to_string(), value);
        Ok(())
    }

    /// True when `name` is a reassignable scalar of this scope.
    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains(name)
    }

    /// Look a constant up through the scope chain.
    pub fn get_const(&self, name: &str) -> Option<&Const> {
        self.consts
            .get(name)
            .or_else(|| self.outer.and_then(|outer| outer.get_const(name)))
    }

    /// Register a gate definition. Definitions live in the root scope.
    pub fn add_gate(&mut self, decl: GateDecl) -> EvalResult<()> {
        if !self.is_global() {
            return Err(EvalError::IllegalDeclaration(decl.name));
        }
        self.gates.insert(decl.name.clone(), Rc::new(decl));
        Ok(())
    }

    pub fn get_gate(&self, name: &str) -> Option<Rc<GateDecl>> {
        self.root().gates.get(name).cloned()
    }

    /// Register a subroutine definition. Definitions live in the root scope.
    pub fn add_subroutine(&mut self, decl: SubroutineDecl) -> EvalResult<()> {
        if !self.is_global() {
            return Err(EvalError::IllegalDeclaration(decl.name));
        }
        self.subroutines.insert(decl.name.clone(), Rc::new(decl));
        Ok(())
    }

    pub fn get_subroutine(&self, name: &str) -> Option<Rc<SubroutineDecl>> {
        self.root().subroutines.get(name).cloned()
    }

    /// Qubits named by an identifier or indexed identifier.
    pub fn qubits(&self, expr: &Expr) -> EvalResult<Vec<QubitId>> {
        let (name, index) = self.register_ref(expr)?;
        self.qubit.get(name, index)
    }

    /// Bits named by an identifier or indexed identifier.
    pub fn bits(&self, expr: &Expr) -> EvalResult<Vec<u8>> {
        let (name, index) = self.register_ref(expr)?;
        self.bit.get(name, index)
    }

    /// Split `q` or `q[i]` into its register name and evaluated index.
    pub fn register_ref<'e>(&self, expr: &'e Expr) -> EvalResult<(&'e str, Option<i64>)> {
        match expr {
            Expr::Ident(name) => Ok((name.as_str(), None)),
            Expr::Index(index) => {
                let i = self.eval_const(&index.index)?.as_int()?;
                Ok((index.name.as_str(), Some(i)))
            }
            other => Err(EvalError::TypeMismatch(format!(
                "expected a register reference, got '{other}'"
            ))),
        }
    }

    /// Fold a classical expression over the visible constants.
    pub fn eval_const(&self, expr: &Expr) -> EvalResult<Const> {
        match expr {
            Expr::Lit(lit) => Const::from_lit(lit),
            Expr::Ident(name) => {
                if let Some(value) = self.get_const(name) {
                    Ok(value.clone())
                } else if self.bit.contains(name) {
                    Value::Bits(self.bits(expr)?).to_const()
                } else {
                    Err(EvalError::UndefinedIdentifier(name.clone()))
                }
            }
            Expr::Index(_) => Value::Bits(self.bits(expr)?).to_const(),
            Expr::Binary(binary) => {
                let left = self.eval_const(&binary.left)?;
                let right = self.eval_const(&binary.right)?;
                left.binary(binary.op, &right)
            }
            Expr::Unary(unary) => self.eval_const(&unary.operand)?.unary(unary.op),
            Expr::Paren(inner) => self.eval_const(inner),
            Expr::Call(_) | Expr::Measure(_) => Err(EvalError::TypeMismatch(format!(
                "'{expr}' is not a constant expression"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qasmi_qasm3::syntax::{BinOp, BlockStmt};

    fn gate(name: &str) -> GateDecl {
        GateDecl {
            name: name.to_string(),
            params: vec![],
            qargs: vec!["q".to_string()],
            body: BlockStmt::default(),
        }
    }

    #[test]
    fn test_normalize_index() {
        assert_eq!(normalize_index(-1, 3), Some(2));
        assert_eq!(normalize_index(-3, 3), Some(0));
        assert_eq!(normalize_index(0, 3), Some(0));
        assert_eq!(normalize_index(3, 3), None);
        assert_eq!(normalize_index(-4, 3), None);
        assert_eq!(normalize_index(0, 0), None);
    }

    #[test]
    fn test_register_table() {
        let mut table = RegisterTable::new();
        table.add("b", vec![QubitId(2), QubitId(3)]);
        table.add("a", vec![QubitId(0)]);
        assert_eq!(table.get("b", None).unwrap(), vec![QubitId(2), QubitId(3)]);
        assert_eq!(table.get("b", Some(-1)).unwrap(), vec![QubitId(3)]);
        assert_eq!(
            table.get("b", Some(2)),
            Err(EvalError::IndexOutOfRange {
                register: "b".into(),
                index: 2,
                size: 2
            })
        );
        assert_eq!(
            table.get("c", None),
            Err(EvalError::UndefinedIdentifier("c".into()))
        );
        assert_eq!(table.all(), vec![QubitId(2), QubitId(3), QubitId(0)]);

        // Overwriting keeps the registration position.
        table.add("b", vec![QubitId(5)]);
        assert_eq!(table.all(), vec![QubitId(5), QubitId(0)]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_root_constants() {
        let env = Environ::new();
        assert_eq!(env.get_const("pi"), Some(&Const::Float(PI)));
        assert_eq!(env.get_const("τ"), Some(&Const::Float(TAU)));
        assert_eq!(env.get_const("euler"), Some(&Const::Float(E)));
    }

    #[test]
    fn test_enclosed_scope_sharing() {
        let mut root = Environ::new();
        root.set_const("n", Const::Int(3));
        root.qubit.add("q", vec![QubitId(0)]);
        root.add_gate(gate("g")).unwrap();

        let mut child = Environ::enclosed(&root, "g", vec![Modifier::inv()]);
        assert!(!child.is_global());
        assert_eq!(child.decls(), ["g"]);
        assert_eq!(child.depth(), 1);
        assert_eq!(child.modifiers(), [Modifier::inv()]);

        // Constants and definitions fall through; registers do not.
        assert_eq!(child.get_const("n"), Some(&Const::Int(3)));
        assert!(child.get_gate("g").is_some());
        assert!(child.qubits(&Expr::ident("q")).is_err());

        // Local constants shadow outer ones.
        child.set_const("n", Const::Int(4));
        assert_eq!(child.get_const("n"), Some(&Const::Int(4)));
        assert!(matches!(
            child.add_gate(gate("h2")),
            Err(EvalError::IllegalDeclaration(_))
        ));

        let grandchild = Environ::enclosed(&child, "k", vec![]);
        assert_eq!(grandchild.decls(), ["g", "k"]);
        assert_eq!(grandchild.get_const("n"), Some(&Const::Int(4)));
    }

    #[test]
    fn test_variables() {
        let mut env = Environ::new();
        env.set_variable("x", Const::Int(0)).unwrap();
        env.set_variable("x", Const::Int(1)).unwrap();
        assert!(env.is_variable("x"));
        assert_eq!(env.get_const("x"), Some(&Const::Int(1)));

        env.set_const("k", Const::Int(2));
        assert_eq!(
            env.set_variable("k", Const::Int(3)),
            Err(EvalError::AssignToConst("k".into()))
        );
    }

    #[test]
    fn test_eval_const() {
        let mut env = Environ::new();
        env.set_const("n", Const::Int(4));
        env.bit.add("c", vec![1, 0]);

        let expr = Expr::binary(Expr::ident("n"), BinOp::Mul, Expr::int(2));
        assert_eq!(env.eval_const(&expr).unwrap(), Const::Int(8));
        assert_eq!(env.eval_const(&Expr::ident("c")).unwrap(), Const::Int(2));
        assert_eq!(
            env.eval_const(&Expr::index("c", Expr::neg(Expr::int(1)))).unwrap(),
            Const::Int(0)
        );
        assert_eq!(
            env.eval_const(&Expr::ident("m")),
            Err(EvalError::UndefinedIdentifier("m".into()))
        );
    }

    #[test]
    fn test_indexed_lookup() {
        let mut env = Environ::new();
        env.set_const("i", Const::Int(1));
        env.qubit.add("q", vec![QubitId(0), QubitId(1), QubitId(2)]);
        assert_eq!(
            env.qubits(&Expr::index("q", Expr::ident("i"))).unwrap(),
            vec![QubitId(1)]
        );
        assert_eq!(
            env.qubits(&Expr::index("q", Expr::neg(Expr::int(1)))).unwrap(),
            vec![QubitId(2)]
        );
        assert!(matches!(
            env.qubits(&Expr::index("q", Expr::int(3))),
            Err(EvalError::IndexOutOfRange { .. })
        ));
    }
}
