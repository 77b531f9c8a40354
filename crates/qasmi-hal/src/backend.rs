//! Backend trait and operations.
//!
//! The [`Backend`] trait is the seam between the evaluator and a quantum
//! state engine. It is synchronous: every call completes before returning.
//!
//! ## Method table
//!
//! | Method | Required | Purpose |
//! |--------|----------|---------|
//! | `name()` | yes | backend identifier |
//! | `num_qubits()` | yes | qubits allocated so far |
//! | `allocate()` | yes | add fresh qubits in `\|0⟩` |
//! | `apply()` | yes | controlled unitary on targets |
//! | `measure()` | yes | sample and collapse one qubit |
//! | `reset()` | yes | return one qubit to `\|0⟩` |
//! | `amplitudes()` | yes | state inspection |
//! | `qft()` / `iqft()` | provided | built from `apply()` |
//! | `cmodexp2()` | provided | unsupported unless overridden |

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{HalError, HalResult};
use crate::gate::StandardGate;
use crate::qubit::QubitId;
use crate::unitary::Unitary;

/// A control qubit. `on == false` is a negative control: the operation fires
/// when the qubit is `|0⟩`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    pub qubit: QubitId,
    pub on: bool,
}

impl Control {
    /// Positive control.
    pub fn on(qubit: QubitId) -> Self {
        Self { qubit, on: true }
    }

    /// Negative control.
    pub fn off(qubit: QubitId) -> Self {
        Self { qubit, on: false }
    }
}

/// A (possibly controlled) unitary applied to target qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub matrix: Unitary,
    pub controls: Vec<Control>,
    pub targets: Vec<QubitId>,
}

impl Operation {
    /// Uncontrolled operation.
    pub fn new(matrix: Unitary, targets: Vec<QubitId>) -> Self {
        Self {
            matrix,
            controls: Vec::new(),
            targets,
        }
    }

    /// Add controls after the existing ones.
    #[must_use]
    pub fn with_controls(mut self, controls: impl IntoIterator<Item = Control>) -> Self {
        self.controls.extend(controls);
        self
    }

    /// Every qubit the operation touches, controls first.
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls
            .iter()
            .map(|c| c.qubit)
            .chain(self.targets.iter().copied())
    }

    /// Check that the matrix matches the targets and no qubit repeats.
    pub fn validate(&self) -> HalResult<()> {
        if self.matrix.num_qubits() != self.targets.len() {
            return Err(HalError::InvalidOperation(format!(
                "{}-qubit matrix applied to {} target(s)",
                self.matrix.num_qubits(),
                self.targets.len()
            )));
        }
        let mut seen: Vec<QubitId> = Vec::with_capacity(self.controls.len() + self.targets.len());
        for qubit in self.qubits() {
            if seen.contains(&qubit) {
                return Err(HalError::DuplicateQubit(qubit));
            }
            seen.push(qubit);
        }
        Ok(())
    }
}

/// Trait for quantum state backends.
///
/// # Contract
///
/// - Qubits are numbered densely from zero in allocation order.
/// - `amplitudes()` index bit `i` is the state of `QubitId(i)`.
/// - `measure()` returns `0` or `1` and leaves the qubit in that state.
/// - Errors leave the state unchanged.
pub trait Backend {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Number of qubits allocated so far.
    fn num_qubits(&self) -> usize;

    /// Allocate `n` fresh qubits in `|0⟩`.
    fn allocate(&mut self, n: usize) -> HalResult<Vec<QubitId>>;

    /// Apply a controlled unitary.
    fn apply(&mut self, op: &Operation) -> HalResult<()>;

    /// Measure one qubit in the computational basis, collapsing the state.
    fn measure(&mut self, qubit: QubitId) -> HalResult<u8>;

    /// Return one qubit to `|0⟩`.
    fn reset(&mut self, qubit: QubitId) -> HalResult<()>;

    /// The full state vector.
    fn amplitudes(&self) -> Vec<Complex64>;

    /// Quantum Fourier transform over `qubits`, read big-endian
    /// (`qubits[0]` is the most significant bit), under extra `controls`.
    fn qft(&mut self, qubits: &[QubitId], controls: &[Control]) -> HalResult<()> {
        for op in qft_operations(qubits, controls)? {
            self.apply(&op)?;
        }
        Ok(())
    }

    /// Inverse of [`Backend::qft`].
    fn iqft(&mut self, qubits: &[QubitId], controls: &[Control]) -> HalResult<()> {
        for op in qft_operations(qubits, controls)?.into_iter().rev() {
            let inverse = Operation {
                matrix: op.matrix.adjoint(),
                ..op
            };
            self.apply(&inverse)?;
        }
        Ok(())
    }

    /// Controlled modular exponentiation:
    /// `|x⟩|y⟩ -> |x⟩|a^x * y mod n⟩` for `y < n`, other states unchanged.
    /// Both registers read big-endian.
    fn cmodexp2(
        &mut self,
        a: u64,
        n: u64,
        control: &[QubitId],
        target: &[QubitId],
    ) -> HalResult<()> {
        let _ = (a, n, control, target);
        Err(HalError::Unsupported(format!(
            "{} does not implement CMODEXP2",
            self.name()
        )))
    }
}

/// Gate sequence of the textbook QFT circuit: Hadamards and controlled
/// phases, then a bit-reversal of the register.
fn qft_operations(qubits: &[QubitId], controls: &[Control]) -> HalResult<Vec<Operation>> {
    let (_, h) = StandardGate::H.decompose(&[])?;
    let (_, swap) = StandardGate::Swap.decompose(&[])?;
    let n = qubits.len();

    let mut ops = Vec::new();
    for j in 0..n {
        ops.push(
            Operation::new(h.clone(), vec![qubits[j]]).with_controls(controls.iter().copied()),
        );
        for k in (j + 1)..n {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let angle = PI / 2_f64.powi((k - j) as i32);
            let (_, phase) = StandardGate::P.decompose(&[angle])?;
            ops.push(
                Operation::new(phase, vec![qubits[j]])
                    .with_controls(std::iter::once(Control::on(qubits[k])))
                    .with_controls(controls.iter().copied()),
            );
        }
    }
    for i in 0..n / 2 {
        ops.push(
            Operation::new(swap.clone(), vec![qubits[i], qubits[n - 1 - i]])
                .with_controls(controls.iter().copied()),
        );
    }
    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_shape() {
        let (_, x) = StandardGate::X.decompose(&[]).unwrap();
        let op = Operation::new(x.clone(), vec![QubitId(0), QubitId(1)]);
        assert!(matches!(op.validate(), Err(HalError::InvalidOperation(_))));

        let op = Operation::new(x, vec![QubitId(0)]).with_controls([Control::on(QubitId(0))]);
        assert_eq!(op.validate(), Err(HalError::DuplicateQubit(QubitId(0))));
    }

    #[test]
    fn test_qft_operation_count() {
        let qubits: Vec<_> = (0..3).map(QubitId).collect();
        let ops = qft_operations(&qubits, &[]).unwrap();
        // 3 Hadamards, 3 controlled phases, 1 swap.
        assert_eq!(ops.len(), 7);
        assert!(ops.iter().all(|op| op.validate().is_ok()));
    }

    #[test]
    fn test_qft_carries_extra_controls() {
        let qubits = [QubitId(1), QubitId(2)];
        let ops = qft_operations(&qubits, &[Control::off(QubitId(0))]).unwrap();
        assert!(
            ops.iter()
                .all(|op| op.controls.contains(&Control::off(QubitId(0))))
        );
    }
}
