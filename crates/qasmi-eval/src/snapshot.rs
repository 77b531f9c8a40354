//! Register snapshots produced by `print`.

use std::fmt;

use num_complex::Complex64;
use qasmi_hal::QubitId;
use serde::Serialize;

/// Amplitudes below this probability are not listed.
const EPSILON: f64 = 1e-10;

/// A named qubit selection, e.g. `q` or `q[1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QubitRegister {
    pub name: String,
    pub qubits: Vec<QubitId>,
}

/// A named bit selection with its current values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitRegister {
    pub name: String,
    pub bits: Vec<u8>,
}

/// One basis state with non-zero amplitude.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasisState {
    /// Index into the full state vector.
    pub index: usize,
    /// One bit string per requested qubit register, element 0 first.
    pub registers: Vec<String>,
    pub amplitude: Complex64,
    pub probability: f64,
}

/// Registers and the quantum state at one point of the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub qubits: Vec<QubitRegister>,
    pub bits: Vec<BitRegister>,
    pub states: Vec<BasisState>,
}

impl Snapshot {
    /// Read the requested qubit registers out of `amplitudes`. Bit `i` of an
    /// amplitude index is the state of `QubitId(i)`.
    pub fn capture(
        qubits: Vec<QubitRegister>,
        bits: Vec<BitRegister>,
        amplitudes: &[Complex64],
    ) -> Self {
        let states = if qubits.is_empty() {
            Vec::new()
        } else {
            amplitudes
                .iter()
                .enumerate()
                .filter(|(_, amp)| amp.norm_sqr() > EPSILON)
                .map(|(index, &amplitude)| BasisState {
                    index,
                    registers: qubits
                        .iter()
                        .map(|reg| {
                            reg.qubits
                                .iter()
                                .map(|q| if (index >> q.index()) & 1 == 1 { '1' } else { '0' })
                                .collect::<String>()
                        })
                        .collect(),
                    amplitude,
                    probability: amplitude.norm_sqr(),
                })
                .collect()
        };
        Self {
            qubits,
            bits,
            states,
        }
    }

    /// Total probability of the listed states.
    pub fn total_probability(&self) -> f64 {
        self.states.iter().map(|s| s.probability).sum()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for reg in &self.bits {
            write!(f, "{}: ", reg.name)?;
            for b in &reg.bits {
                write!(f, "{b}")?;
            }
            writeln!(f)?;
        }
        for state in &self.states {
            for bits in &state.registers {
                write!(f, "[{bits}]")?;
            }
            writeln!(
                f,
                " {:+.4}{:+.4}i  {:.4}",
                state.amplitude.re, state.amplitude.im, state.probability
            )?;
        }
        Ok(())
    }
}
