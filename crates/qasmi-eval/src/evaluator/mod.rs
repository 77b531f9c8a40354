//! Tree-walking evaluation of a parsed program.

mod call;
mod gate;

use qasmi_adapter_sim::StatevectorBackend;
use qasmi_hal::Backend;
use qasmi_qasm3::syntax::{Decl, Expr, GenDecl, IndexExpr, Program, Stmt, TypeKind, TypeSpec};
use tracing::{debug, trace};

use crate::config::EvalConfig;
use crate::environ::{Environ, normalize_index};
use crate::error::{EvalError, EvalResult};
use crate::object::{Const, Value};
use crate::snapshot::{BitRegister, QubitRegister, Snapshot};

/// How control leaves a statement.
pub(crate) enum Flow {
    /// Continue with the next statement. Carries the value of an
    /// expression statement.
    Continue(Value),
    /// A `return` was executed.
    Return(Value),
}

/// Evaluates statements against a persistent global scope and one backend.
///
/// State survives between calls, so a program can be fed in one statement at
/// a time.
pub struct Evaluator<B: Backend = StatevectorBackend> {
    env: Environ<'static>,
    runtime: Runtime<B>,
}

/// Everything but the scope chain, so scopes can be borrowed alongside.
pub(crate) struct Runtime<B> {
    backend: B,
    config: EvalConfig,
    output: Vec<Snapshot>,
}

impl Evaluator<StatevectorBackend> {
    /// Evaluator on a fresh statevector simulator with default settings.
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    /// Evaluator on a fresh statevector simulator.
    pub fn with_config(config: EvalConfig) -> Self {
        let backend = match config.seed {
            Some(seed) => StatevectorBackend::with_seed(seed),
            None => StatevectorBackend::new(),
        }
        .with_max_qubits(config.max_qubits);
        Self::with_backend(backend, config)
    }
}

impl Default for Evaluator<StatevectorBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Evaluator<B> {
    /// Evaluator driving `backend`.
    pub fn with_backend(backend: B, config: EvalConfig) -> Self {
        Self {
            env: Environ::new(),
            runtime: Runtime {
                backend,
                config,
                output: Vec::new(),
            },
        }
    }

    /// Evaluate every statement in order, stopping at the first error or a
    /// top-level `return`.
    pub fn eval_program(&mut self, program: &Program) -> EvalResult<()> {
        debug!(statements = program.statements.len(), "Evaluating program");
        for stmt in &program.statements {
            if let Flow::Return(_) = self.eval(stmt)? {
                break;
            }
        }
        Ok(())
    }

    /// Evaluate one top-level statement. Returns the value of an expression
    /// statement such as `measure q;`, otherwise [`Value::None`].
    ///
    /// On error, effects of earlier statements stay committed.
    pub fn eval_stmt(&mut self, stmt: &Stmt) -> EvalResult<Value> {
        match self.eval(stmt)? {
            Flow::Continue(value) | Flow::Return(value) => Ok(value),
        }
    }

    fn eval(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        self.runtime
            .eval_stmt(&mut self.env, stmt)
            .map_err(|source| EvalError::Statement {
                stmt: stmt.to_string(),
                source: Box::new(source),
            })
    }

    /// The global scope.
    pub fn environ(&self) -> &Environ<'static> {
        &self.env
    }

    pub fn backend(&self) -> &B {
        &self.runtime.backend
    }

    pub fn config(&self) -> &EvalConfig {
        &self.runtime.config
    }

    /// Drain the snapshots recorded by `print` statements.
    pub fn take_output(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.runtime.output)
    }

    /// Every global register and the current quantum state.
    pub fn snapshot(&self) -> Snapshot {
        let (qubits, bits) = all_registers(&self.env);
        Snapshot::capture(qubits, bits, &self.runtime.backend.amplitudes())
    }
}

impl<B: Backend> Runtime<B> {
    /// Evaluate statements in order until one returns.
    pub(crate) fn eval_block(&mut self, env: &mut Environ<'_>, stmts: &[Stmt]) -> EvalResult<Flow> {
        for stmt in stmts {
            if let Flow::Return(value) = self.eval_stmt(env, stmt)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue(Value::None))
    }

    pub(crate) fn eval_stmt(&mut self, env: &mut Environ<'_>, stmt: &Stmt) -> EvalResult<Flow> {
        debug!(depth = env.depth(), stmt = %stmt, "eval");
        match stmt {
            Stmt::Decl(decl) => self.eval_decl(env, decl)?,
            Stmt::Include(path) => debug!(%path, "include skipped: standard gates are built in"),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_value(env, expr)?,
                    None => Value::None,
                };
                return Ok(Flow::Return(value));
            }
            Stmt::Arrow(arrow) => {
                let value = self.eval_value(env, &arrow.left)?;
                self.assign(env, &arrow.right, value)?;
            }
            Stmt::Assign(assign) => {
                let value = self.eval_value(env, &assign.right)?;
                self.assign(env, &assign.left, value)?;
            }
            Stmt::Reset(qargs) => self.reset(env, qargs)?,
            Stmt::Print(args) => {
                let snapshot = self.snapshot(env, args)?;
                self.output.push(snapshot);
            }
            Stmt::Apply(apply) => self.apply_builtin(env, apply)?,
            Stmt::Block(block) => return self.eval_block(env, &block.stmts),
            Stmt::Expr(expr @ (Expr::Call(_) | Expr::Measure(_))) => {
                return Ok(Flow::Continue(self.eval_value(env, expr)?));
            }
            Stmt::Expr(other) => {
                return Err(EvalError::InvalidStatement(format!(
                    "expression '{other}' has no effect"
                )));
            }
        }
        Ok(Flow::Continue(Value::None))
    }

    fn eval_decl(&mut self, env: &mut Environ<'_>, decl: &Decl) -> EvalResult<()> {
        match decl {
            Decl::Version(_) => {}
            Decl::Gen(gen_decl) => match gen_decl.kind() {
                TypeKind::Qubit => {
                    if !env.is_global() {
                        return Err(EvalError::IllegalDeclaration(gen_decl.name.clone()));
                    }
                    let size = decl_size(env, gen_decl)?;
                    let qubits = self.backend.allocate(size)?;
                    trace!(name = %gen_decl.name, ?qubits, "allocate");
                    env.qubit.add(gen_decl.name.clone(), qubits);
                }
                TypeKind::Bit => {
                    let size = decl_size(env, gen_decl)?;
                    env.bit.add(gen_decl.name.clone(), vec![0; size]);
                }
                kind => env.set_variable(&gen_decl.name, Const::Int(0).coerce(kind)?)?,
            },
            Decl::Const(const_decl) => {
                let mut value = env.eval_const(&const_decl.value)?;
                if let Some(ty) = &const_decl.ty {
                    value = value.coerce(ty.kind)?;
                }
                env.set_const(const_decl.name.clone(), value);
            }
            Decl::Gate(gate) => env.add_gate(gate.clone())?,
            Decl::Subroutine(def) => env.add_subroutine(def.clone())?,
        }
        Ok(())
    }

    /// Evaluate an expression to a classical value. Bit registers read as
    /// bit strings, measurements and calls run.
    pub(crate) fn eval_value(&mut self, env: &mut Environ<'_>, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Measure(measure) => {
                check_unitary_context(env, "measure")?;
                let qubits = if measure.qargs.is_empty() {
                    env.qubit.all()
                } else {
                    let mut qubits = Vec::new();
                    for qarg in &measure.qargs {
                        qubits.extend(env.qubits(qarg)?);
                    }
                    qubits
                };
                let mut bits = Vec::with_capacity(qubits.len());
                for qubit in qubits {
                    bits.push(self.backend.measure(qubit)?);
                }
                trace!(?bits, "measure");
                Ok(Value::Bits(bits))
            }
            Expr::Call(call) => self.call(env, call),
            Expr::Ident(name) | Expr::Index(IndexExpr { name, .. }) if env.bit.contains(name) => {
                Ok(Value::Bits(env.bits(expr)?))
            }
            other => Ok(Value::Const(env.eval_const(other)?)),
        }
    }

    /// Store `value` into a bit register, bit, or reassignable scalar.
    fn assign(&mut self, env: &mut Environ<'_>, target: &Expr, value: Value) -> EvalResult<()> {
        let (name, index) = env.register_ref(target)?;
        if let Some(register) = env.bit.register_mut(name) {
            match index {
                None => *register = value.to_bits(register.len())?,
                Some(i) => {
                    let size = register.len();
                    let at = normalize_index(i, size).ok_or_else(|| {
                        EvalError::IndexOutOfRange {
                            register: name.to_string(),
                            index: i,
                            size,
                        }
                    })?;
                    register[at] = value.to_bits(1)?[0];
                }
            }
            return Ok(());
        }
        if index.is_none() && env.is_variable(name) {
            return env.set_variable(name, value.to_const()?);
        }
        if env.qubit.contains(name) {
            return Err(EvalError::TypeMismatch(format!(
                "cannot assign to qubit register '{name}'"
            )));
        }
        if env.get_const(name).is_some() {
            return Err(EvalError::AssignToConst(name.to_string()));
        }
        Err(EvalError::UndefinedIdentifier(name.to_string()))
    }

    fn reset(&mut self, env: &Environ<'_>, qargs: &[Expr]) -> EvalResult<()> {
        check_unitary_context(env, "reset")?;
        for qarg in qargs {
            for qubit in env.qubits(qarg)? {
                self.backend.reset(qubit)?;
            }
        }
        Ok(())
    }

    /// Snapshot of the requested registers, or every register in scope.
    fn snapshot(&self, env: &Environ<'_>, args: &[Expr]) -> EvalResult<Snapshot> {
        let (qubits, bits) = if args.is_empty() {
            all_registers(env)
        } else {
            let mut qubits = Vec::new();
            let mut bits = Vec::new();
            for arg in args {
                let (name, _) = env.register_ref(arg)?;
                if env.qubit.contains(name) {
                    qubits.push(QubitRegister {
                        name: arg.to_string(),
                        qubits: env.qubits(arg)?,
                    });
                } else if env.bit.contains(name) {
                    bits.push(BitRegister {
                        name: arg.to_string(),
                        bits: env.bits(arg)?,
                    });
                } else {
                    return Err(EvalError::UndefinedIdentifier(name.to_string()));
                }
            }
            (qubits, bits)
        };
        Ok(Snapshot::capture(qubits, bits, &self.backend.amplitudes()))
    }
}

fn all_registers(env: &Environ<'_>) -> (Vec<QubitRegister>, Vec<BitRegister>) {
    let qubits = env
        .qubit
        .iter()
        .filter(|(name, _)| !name.starts_with(call::CONTROL_PREFIX))
        .map(|(name, qubits)| QubitRegister {
            name: name.to_string(),
            qubits: qubits.to_vec(),
        })
        .collect();
    let bits = env
        .bit
        .iter()
        .map(|(name, bits)| BitRegister {
            name: name.to_string(),
            bits: bits.to_vec(),
        })
        .collect();
    (qubits, bits)
}

/// Number of elements a register declaration allocates. Symbolic sizes are
/// folded over the visible constants.
pub(crate) fn decl_size(env: &Environ<'_>, decl: &GenDecl) -> EvalResult<usize> {
    match decl.size() {
        Some(size) => Ok(size),
        None => type_size(env, &decl.ty),
    }
}

/// Width of a register type; unsized types hold one element.
pub(crate) fn type_size(env: &Environ<'_>, ty: &TypeSpec) -> EvalResult<usize> {
    let size = match ty.size.as_deref() {
        Some(expr) => env.eval_const(expr)?.as_int()?,
        None => 1,
    };
    usize::try_from(size)
        .map_err(|_| EvalError::TypeMismatch(format!("register size {size} is negative")))
}

/// Measurement and reset are not unitary, so they cannot run inside a call
/// that carries modifiers.
fn check_unitary_context(env: &Environ<'_>, what: &str) -> EvalResult<()> {
    match env.modifiers().first() {
        None => Ok(()),
        Some(modifier) => Err(EvalError::InvalidModifier(format!(
            "'{}' cannot apply to non-unitary '{what}' in '{}'",
            modifier.kind.name(),
            env.decls().last().map_or("", String::as_str)
        ))),
    }
}
