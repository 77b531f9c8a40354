//! Calls to user-defined gates, subroutines and lower-case standard gates.
//!
//! A gate call never touches the backend directly. Its body is rewritten
//! for the call's modifiers and evaluated in a child scope:
//!
//! | Modifier | Body rewrite |
//! |----------|--------------|
//! | `inv` | [`BlockStmt::inv`] |
//! | `pow(k)`, `k >= 0` | [`BlockStmt::pow`] |
//! | `pow(k)`, `k < 0` | `inv` then `pow(-k)` |
//! | `ctrl(n)` / `negctrl(n)` | [`BlockStmt::add`] with `n` control qubits |
//!
//! Control qubits resolved in the caller are bound in the child scope as
//! `__ctrl0`, `__ctrl1`, ... so that every rewritten statement can name them.

use qasmi_hal::{Backend, QubitId, StandardGate};
use qasmi_qasm3::syntax::{
    BlockStmt, CallExpr, Expr, GateDecl, Modifier, ModifierKind, SubroutineDecl, TypeKind,
};
use tracing::debug;

use super::gate::{control_count, pow_exponent, single_qubit};
use super::{Flow, Runtime, decl_size, type_size};
use crate::environ::Environ;
use crate::error::{EvalError, EvalResult};
use crate::object::{Const, Value};

/// Prefix of the names control qubits are bound under.
pub(crate) const CONTROL_PREFIX: &str = "__ctrl";

/// Name under which the `i`-th control qubit is bound in a gate body.
fn control_name(i: usize) -> String {
    format!("{CONTROL_PREFIX}{i}")
}

/// An evaluated subroutine argument.
enum Arg {
    Qubits(Vec<QubitId>),
    Bits(Vec<u8>),
    Scalar(Const),
}

impl<B: Backend> Runtime<B> {
    /// Dispatch a call. User definitions shadow standard gates of the same
    /// name.
    pub(crate) fn call(&mut self, env: &mut Environ<'_>, call: &CallExpr) -> EvalResult<Value> {
        if let Some(gate) = env.get_gate(&call.name) {
            return self.call_gate(env, &gate, call);
        }
        if let Some(def) = env.get_subroutine(&call.name) {
            return self.call_subroutine(env, &def, call);
        }
        match StandardGate::from_name(&call.name) {
            Some(gate) => {
                self.apply_standard(env, gate, &call.modifiers, &call.params, &call.qargs)?;
                Ok(Value::None)
            }
            None => Err(EvalError::UnknownGate(call.name.clone())),
        }
    }

    /// Guard against recursion and runaway nesting before entering `name`.
    fn enter(&self, env: &Environ<'_>, name: &str) -> EvalResult<()> {
        if env.decls().iter().any(|d| d == name) {
            return Err(EvalError::Recursion(name.to_string()));
        }
        if env.depth() >= self.config.max_depth {
            return Err(EvalError::RecursionLimit(self.config.max_depth));
        }
        Ok(())
    }

    fn call_gate(&mut self, env: &Environ<'_>, gate: &GateDecl, call: &CallExpr) -> EvalResult<Value> {
        self.enter(env, &gate.name)?;
        if call.params.len() != gate.params.len() {
            return Err(EvalError::ArityMismatch {
                name: gate.name.clone(),
                what: "parameter(s)",
                expected: gate.params.len(),
                got: call.params.len(),
            });
        }
        let params = call
            .params
            .iter()
            .map(|p| env.eval_const(p))
            .collect::<EvalResult<Vec<_>>>()?;

        let counts = call
            .modifiers
            .iter()
            .map(|m| if m.is_control() { control_count(env, m) } else { Ok(0) })
            .collect::<EvalResult<Vec<_>>>()?;
        let n_controls: usize = counts.iter().sum();
        let expected = n_controls + gate.qargs.len();
        if call.qargs.len() != expected {
            return Err(EvalError::ArityMismatch {
                name: gate.name.clone(),
                what: "qubit argument(s)",
                expected,
                got: call.qargs.len(),
            });
        }
        let controls = call.qargs[..n_controls]
            .iter()
            .map(|q| single_qubit(env, q))
            .collect::<EvalResult<Vec<_>>>()?;
        let targets = call.qargs[n_controls..]
            .iter()
            .map(|q| env.qubits(q))
            .collect::<EvalResult<Vec<_>>>()?;

        let body = rewrite_body(env, gate, &call.modifiers, &counts, self.config.max_unroll)?;

        let mut scope = Environ::enclosed(env, &gate.name, call.modifiers.clone());
        for (i, qubit) in controls.into_iter().enumerate() {
            scope.qubit.add(control_name(i), vec![qubit]);
        }
        for (name, qubits) in gate.qargs.iter().zip(targets) {
            scope.qubit.add(name.clone(), qubits);
        }
        for (name, value) in gate.params.iter().zip(params) {
            scope.set_const(name.clone(), value);
        }

        debug!(
            gate = %gate.name,
            depth = scope.depth(),
            controls = n_controls,
            statements = body.len(),
            "call gate"
        );
        self.eval_block(&mut scope, &body.stmts)?;
        Ok(Value::None)
    }

    fn call_subroutine(
        &mut self,
        env: &mut Environ<'_>,
        def: &SubroutineDecl,
        call: &CallExpr,
    ) -> EvalResult<Value> {
        if let Some(modifier) = call.modifiers.first() {
            return Err(EvalError::InvalidModifier(format!(
                "'{}' cannot apply to subroutine '{}'",
                modifier.kind.name(),
                def.name
            )));
        }
        self.enter(env, &def.name)?;
        if call.params.len() != def.params.len() {
            return Err(EvalError::ArityMismatch {
                name: def.name.clone(),
                what: "argument(s)",
                expected: def.params.len(),
                got: call.params.len(),
            });
        }
        if call.qargs.len() != def.qargs.len() {
            return Err(EvalError::ArityMismatch {
                name: def.name.clone(),
                what: "qubit argument(s)",
                expected: def.qargs.len(),
                got: call.qargs.len(),
            });
        }

        // Arguments are evaluated in the caller, left to right, before the
        // child scope exists.
        let mut args = Vec::with_capacity(def.params.len());
        for (decl, arg) in def.params.iter().zip(&call.params) {
            let bound = match decl.kind() {
                TypeKind::Qubit => {
                    let qubits = env.qubits(arg)?;
                    let size = decl_size(env, decl)?;
                    if qubits.len() != size {
                        return Err(EvalError::SizeMismatch {
                            expected: size,
                            got: qubits.len(),
                        });
                    }
                    Arg::Qubits(qubits)
                }
                TypeKind::Bit => {
                    let size = decl_size(env, decl)?;
                    Arg::Bits(self.eval_value(env, arg)?.to_bits(size)?)
                }
                kind => Arg::Scalar(self.eval_value(env, arg)?.to_const()?.coerce(kind)?),
            };
            args.push(bound);
        }
        let qargs = call
            .qargs
            .iter()
            .map(|q| env.qubits(q))
            .collect::<EvalResult<Vec<_>>>()?;

        let mut scope = Environ::enclosed(&*env, &def.name, Vec::new());
        for (decl, arg) in def.params.iter().zip(args) {
            match arg {
                Arg::Qubits(qubits) => scope.qubit.add(decl.name.clone(), qubits),
                Arg::Bits(bits) => scope.bit.add(decl.name.clone(), bits),
                Arg::Scalar(value) => scope.set_variable(&decl.name, value)?,
            }
        }
        for (name, qubits) in def.qargs.iter().zip(qargs) {
            scope.qubit.add(name.clone(), qubits);
        }

        debug!(subroutine = %def.name, depth = scope.depth(), "call subroutine");
        let value = match self.eval_block(&mut scope, &def.body.stmts)? {
            Flow::Return(value) => value,
            Flow::Continue(_) => Value::None,
        };

        match &def.ret {
            None => Ok(value),
            Some(ty) => match ty.kind {
                TypeKind::Bit => Ok(Value::Bits(value.to_bits(type_size(&scope, ty)?)?)),
                TypeKind::Qubit => Err(EvalError::TypeMismatch(format!(
                    "subroutine '{}' cannot return qubits",
                    def.name
                ))),
                kind => Ok(Value::Const(value.to_const()?.coerce(kind)?)),
            },
        }
    }
}

/// Rewrite a gate body for a call's modifiers, innermost modifier first.
/// `counts[i]` is the number of control qubits modifier `i` takes. The
/// rewritten body may hold at most `limit` statements.
fn rewrite_body(
    env: &Environ<'_>,
    gate: &GateDecl,
    modifiers: &[Modifier],
    counts: &[usize],
    limit: usize,
) -> EvalResult<BlockStmt> {
    let mut offset: usize = counts.iter().sum();
    let mut body = gate.body.clone();
    for (modifier, &count) in modifiers.iter().zip(counts).rev() {
        body = match modifier.kind {
            ModifierKind::Inv => body.inv(),
            ModifierKind::Pow => {
                let k = pow_exponent(env, modifier)?;
                let n = usize::try_from(k.unsigned_abs())
                    .map_err(|_| EvalError::Overflow(format!("pow({k})")))?;
                if body.len().checked_mul(n).is_none_or(|len| len > limit) {
                    return Err(EvalError::UnrollLimit {
                        name: gate.name.clone(),
                        limit,
                    });
                }
                if k < 0 { body.inv().pow(n) } else { body.pow(n) }
            }
            ModifierKind::Ctrl | ModifierKind::NegCtrl => {
                offset -= count;
                let arg = if count > 1 {
                    let n = i64::try_from(count)
                        .map_err(|_| EvalError::Overflow(format!("ctrl({count})")))?;
                    Some(Expr::int(n))
                } else {
                    None
                };
                let qargs: Vec<Expr> = (offset..offset + count)
                    .map(|i| Expr::ident(control_name(i)))
                    .collect();
                body.add(&Modifier::new(modifier.kind, arg), &qargs)
            }
        };
    }
    Ok(body)
}
