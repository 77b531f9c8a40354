//! Built-in gate application.

use qasmi_hal::{Backend, Control, Operation, QubitId, StandardGate};
use qasmi_qasm3::syntax::{ApplyStmt, Builtin, Expr, Modifier, ModifierKind};
use tracing::trace;

use super::Runtime;
use crate::environ::Environ;
use crate::error::{EvalError, EvalResult};
use crate::object::Const;

/// Modifiers folded for a built-in gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Modifiers {
    /// Polarity of each control qubit, in qarg order.
    pub controls: Vec<bool>,
    /// Net exponent; `inv` negates it.
    pub power: i64,
}

/// Fold a modifier list, outermost first. `inv` and `pow` commute, so the
/// net effect is one exponent.
pub(crate) fn resolve_modifiers(env: &Environ<'_>, modifiers: &[Modifier]) -> EvalResult<Modifiers> {
    let mut controls = Vec::new();
    let mut power: i64 = 1;
    for modifier in modifiers {
        match modifier.kind {
            ModifierKind::Ctrl | ModifierKind::NegCtrl => {
                let n = control_count(env, modifier)?;
                let on = modifier.kind == ModifierKind::Ctrl;
                controls.extend(std::iter::repeat_n(on, n));
            }
            ModifierKind::Inv => power = -power,
            ModifierKind::Pow => {
                let k = pow_exponent(env, modifier)?;
                power = power
                    .checked_mul(k)
                    .ok_or_else(|| EvalError::Overflow(format!("pow({k})")))?;
            }
        }
    }
    Ok(Modifiers { controls, power })
}

/// Number of control qubits a `ctrl`/`negctrl` modifier takes.
pub(crate) fn control_count(env: &Environ<'_>, modifier: &Modifier) -> EvalResult<usize> {
    let Some(arg) = &modifier.arg else {
        return Ok(1);
    };
    match env.eval_const(arg)? {
        Const::Int(n) if n >= 1 => usize::try_from(n)
            .map_err(|_| EvalError::InvalidModifier(format!("{}({n})", modifier.kind.name()))),
        other => Err(EvalError::InvalidModifier(format!(
            "{} needs a positive integer count, got {other}",
            modifier.kind.name()
        ))),
    }
}

/// The integer exponent of a `pow` modifier.
pub(crate) fn pow_exponent(env: &Environ<'_>, modifier: &Modifier) -> EvalResult<i64> {
    let Some(arg) = &modifier.arg else {
        return Err(EvalError::InvalidModifier("pow without exponent".to_string()));
    };
    match env.eval_const(arg)? {
        Const::Int(k) => Ok(k),
        other => Err(EvalError::InvalidModifier(format!(
            "pow exponent must be an integer, got {other}"
        ))),
    }
}

/// Pair up resolved qargs: every argument is one qubit or a register of a
/// common size `n`, and the gate runs once per element.
fn broadcast(args: &[Vec<QubitId>]) -> EvalResult<Vec<Vec<QubitId>>> {
    let n = args.iter().map(Vec::len).max().unwrap_or(1);
    for arg in args {
        if arg.len() != 1 && arg.len() != n {
            return Err(EvalError::SizeMismatch {
                expected: n,
                got: arg.len(),
            });
        }
    }
    Ok((0..n)
        .map(|i| {
            args.iter()
                .map(|arg| if arg.len() == 1 { arg[0] } else { arg[i] })
                .collect()
        })
        .collect())
}

impl<B: Backend> Runtime<B> {
    /// Apply a built-in gate statement.
    pub(crate) fn apply_builtin(&mut self, env: &Environ<'_>, apply: &ApplyStmt) -> EvalResult<()> {
        let gate = match apply.kind {
            Builtin::Qft | Builtin::Iqft => {
                return self.apply_fourier(env, apply, apply.kind == Builtin::Iqft);
            }
            Builtin::CModExp2 => return self.apply_cmodexp2(env, apply),
            Builtin::U => StandardGate::U,
            Builtin::X => StandardGate::X,
            Builtin::Y => StandardGate::Y,
            Builtin::Z => StandardGate::Z,
            Builtin::H => StandardGate::H,
            Builtin::S => StandardGate::S,
            Builtin::T => StandardGate::T,
        };
        self.apply_standard(env, gate, &apply.modifiers, &apply.params, &apply.qargs)
    }

    /// Apply a standard gate under modifiers, broadcasting over registers.
    ///
    /// The leading qargs are the modifier controls, then the gate's own
    /// controls (`cx` has one), then its targets.
    pub(crate) fn apply_standard(
        &mut self,
        env: &Environ<'_>,
        gate: StandardGate,
        modifiers: &[Modifier],
        params: &[Expr],
        qargs: &[Expr],
    ) -> EvalResult<()> {
        let modifiers = resolve_modifiers(env, modifiers)?;
        if params.len() != gate.num_params() {
            return Err(EvalError::ArityMismatch {
                name: gate.name().to_string(),
                what: "parameter(s)",
                expected: gate.num_params(),
                got: params.len(),
            });
        }
        let expected = modifiers.controls.len() + gate.num_qubits();
        if qargs.len() != expected {
            return Err(EvalError::ArityMismatch {
                name: gate.name().to_string(),
                what: "qubit argument(s)",
                expected,
                got: qargs.len(),
            });
        }

        let params = params
            .iter()
            .map(|p| env.eval_const(p)?.as_f64())
            .collect::<EvalResult<Vec<_>>>()?;
        let (intrinsic, base) = gate.decompose(&params)?;
        let matrix = if modifiers.power == 1 {
            base
        } else {
            base.pow(modifiers.power)
        };

        let polarity: Vec<bool> = modifiers
            .controls
            .iter()
            .copied()
            .chain(std::iter::repeat_n(true, intrinsic))
            .collect();
        let resolved = qargs
            .iter()
            .map(|q| env.qubits(q))
            .collect::<EvalResult<Vec<_>>>()?;

        for qubits in broadcast(&resolved)? {
            let (controls, targets) = qubits.split_at(polarity.len());
            let op = Operation::new(matrix.clone(), targets.to_vec()).with_controls(
                controls
                    .iter()
                    .zip(&polarity)
                    .map(|(&qubit, &on)| Control { qubit, on }),
            );
            trace!(gate = gate.name(), ?controls, ?targets, "apply");
            self.backend.apply(&op)?;
        }
        Ok(())
    }

    /// `QFT`/`IQFT` over the concatenation of the non-control qargs.
    /// `inv` swaps the direction and `pow(k)` repeats it.
    fn apply_fourier(&mut self, env: &Environ<'_>, apply: &ApplyStmt, inverse: bool) -> EvalResult<()> {
        let name = apply.kind.name();
        if !apply.params.is_empty() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                what: "parameter(s)",
                expected: 0,
                got: apply.params.len(),
            });
        }
        let modifiers = resolve_modifiers(env, &apply.modifiers)?;
        let n_controls = modifiers.controls.len();
        if apply.qargs.len() <= n_controls {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                what: "qubit argument(s)",
                expected: n_controls + 1,
                got: apply.qargs.len(),
            });
        }

        let mut controls = Vec::with_capacity(n_controls);
        for (qarg, &on) in apply.qargs.iter().zip(&modifiers.controls) {
            controls.push(Control {
                qubit: single_qubit(env, qarg)?,
                on,
            });
        }
        let mut register = Vec::new();
        for qarg in &apply.qargs[n_controls..] {
            register.extend(env.qubits(qarg)?);
        }

        let inverse = inverse ^ (modifiers.power < 0);
        trace!(name, inverse, repeat = modifiers.power.unsigned_abs(), ?register, "fourier");
        for _ in 0..modifiers.power.unsigned_abs() {
            if inverse {
                self.backend.iqft(&register, &controls)?;
            } else {
                self.backend.qft(&register, &controls)?;
            }
        }
        Ok(())
    }

    /// `CMODEXP2(a, N) control, target;`
    fn apply_cmodexp2(&mut self, env: &Environ<'_>, apply: &ApplyStmt) -> EvalResult<()> {
        if let Some(modifier) = apply.modifiers.first() {
            return Err(EvalError::InvalidModifier(format!(
                "'{}' cannot apply to CMODEXP2",
                modifier.kind.name()
            )));
        }
        if apply.params.len() != 2 {
            return Err(EvalError::ArityMismatch {
                name: "CMODEXP2".to_string(),
                what: "parameter(s)",
                expected: 2,
                got: apply.params.len(),
            });
        }
        if apply.qargs.len() != 2 {
            return Err(EvalError::ArityMismatch {
                name: "CMODEXP2".to_string(),
                what: "qubit argument(s)",
                expected: 2,
                got: apply.qargs.len(),
            });
        }

        let a = non_negative(env, &apply.params[0])?;
        let n = non_negative(env, &apply.params[1])?;
        let control = env.qubits(&apply.qargs[0])?;
        let target = env.qubits(&apply.qargs[1])?;
        trace!(a, n, ?control, ?target, "cmodexp2");
        self.backend.cmodexp2(a, n, &control, &target)?;
        Ok(())
    }
}

pub(crate) fn single_qubit(env: &Environ<'_>, qarg: &Expr) -> EvalResult<QubitId> {
    match env.qubits(qarg)?.as_slice() {
        [qubit] => Ok(*qubit),
        other => Err(EvalError::SizeMismatch {
            expected: 1,
            got: other.len(),
        }),
    }
}

fn non_negative(env: &Environ<'_>, expr: &Expr) -> EvalResult<u64> {
    let value = env.eval_const(expr)?.as_int()?;
    u64::try_from(value)
        .map_err(|_| EvalError::TypeMismatch(format!("expected a non-negative int, got {value}")))
}
