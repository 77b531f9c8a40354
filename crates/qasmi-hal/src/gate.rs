//! Standard gate table.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};

use crate::error::{HalError, HalResult};
use crate::unitary::Unitary;

/// Gates with known semantics, looked up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// Rotation around X axis.
    Rx,
    /// Rotation around Y axis.
    Ry,
    /// Rotation around Z axis.
    Rz,
    /// Phase gate.
    P,
    /// Universal single-qubit gate U(θ, φ, λ).
    U,

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// Controlled-Hadamard gate.
    CH,
    /// SWAP gate.
    Swap,
    /// Controlled rotation around X.
    CRx,
    /// Controlled rotation around Y.
    CRy,
    /// Controlled rotation around Z.
    CRz,
    /// Controlled phase gate.
    CP,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
    /// Fredkin gate (CSWAP).
    CSwap,
}

impl StandardGate {
    /// Every gate in the table.
    pub const ALL: [StandardGate; 26] = [
        StandardGate::I,
        StandardGate::X,
        StandardGate::Y,
        StandardGate::Z,
        StandardGate::H,
        StandardGate::S,
        StandardGate::Sdg,
        StandardGate::T,
        StandardGate::Tdg,
        StandardGate::SX,
        StandardGate::Rx,
        StandardGate::Ry,
        StandardGate::Rz,
        StandardGate::P,
        StandardGate::U,
        StandardGate::CX,
        StandardGate::CY,
        StandardGate::CZ,
        StandardGate::CH,
        StandardGate::Swap,
        StandardGate::CRx,
        StandardGate::CRy,
        StandardGate::CRz,
        StandardGate::CP,
        StandardGate::CCX,
        StandardGate::CSwap,
    ];

    /// Look a gate up by name, ignoring case: `h` and `H` are the same gate.
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|g| g.name() == lower)
    }

    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::Rx => "rx",
            StandardGate::Ry => "ry",
            StandardGate::Rz => "rz",
            StandardGate::P => "p",
            StandardGate::U => "u",
            StandardGate::CX => "cx",
            StandardGate::CY => "cy",
            StandardGate::CZ => "cz",
            StandardGate::CH => "ch",
            StandardGate::Swap => "swap",
            StandardGate::CRx => "crx",
            StandardGate::CRy => "cry",
            StandardGate::CRz => "crz",
            StandardGate::CP => "cp",
            StandardGate::CCX => "ccx",
            StandardGate::CSwap => "cswap",
        }
    }

    /// Number of qubits the gate takes, controls included.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::CX
            | StandardGate::CY
            | StandardGate::CZ
            | StandardGate::CH
            | StandardGate::Swap
            | StandardGate::CRx
            | StandardGate::CRy
            | StandardGate::CRz
            | StandardGate::CP => 2,

            StandardGate::CCX | StandardGate::CSwap => 3,

            _ => 1,
        }
    }

    /// Number of angle parameters.
    #[inline]
    pub fn num_params(&self) -> usize {
        match self {
            StandardGate::Rx
            | StandardGate::Ry
            | StandardGate::Rz
            | StandardGate::P
            | StandardGate::CRx
            | StandardGate::CRy
            | StandardGate::CRz
            | StandardGate::CP => 1,

            StandardGate::U => 3,

            _ => 0,
        }
    }

    /// Split the gate into leading control qubits and the unitary applied to
    /// the remaining targets.
    ///
    /// `cx` is one control on `X`; `ccx` two controls on `X`; `swap` no
    /// controls on a two-qubit matrix.
    pub fn decompose(&self, params: &[f64]) -> HalResult<(usize, Unitary)> {
        if params.len() != self.num_params() {
            return Err(HalError::InvalidGate(format!(
                "{} takes {} parameter(s), got {}",
                self.name(),
                self.num_params(),
                params.len()
            )));
        }
        let theta = params.first().copied().unwrap_or_default();

        let decomposed = match self {
            StandardGate::I => (0, Unitary::identity(1)),
            StandardGate::X => (0, x()),
            StandardGate::Y => (0, y()),
            StandardGate::Z => (0, phase(std::f64::consts::PI)),
            StandardGate::H => (0, h()),
            StandardGate::S => (0, phase(FRAC_PI_2)),
            StandardGate::Sdg => (0, phase(-FRAC_PI_2)),
            StandardGate::T => (0, phase(FRAC_PI_4)),
            StandardGate::Tdg => (0, phase(-FRAC_PI_4)),
            StandardGate::SX => (0, rx(FRAC_PI_2)),
            StandardGate::Rx => (0, rx(theta)),
            StandardGate::Ry => (0, ry(theta)),
            StandardGate::Rz => (0, rz(theta)),
            StandardGate::P => (0, phase(theta)),
            StandardGate::U => (0, u(params[0], params[1], params[2])),
            StandardGate::CX => (1, x()),
            StandardGate::CY => (1, y()),
            StandardGate::CZ => (1, phase(std::f64::consts::PI)),
            StandardGate::CH => (1, h()),
            StandardGate::Swap => (0, swap()),
            StandardGate::CRx => (1, rx(theta)),
            StandardGate::CRy => (1, ry(theta)),
            StandardGate::CRz => (1, rz(theta)),
            StandardGate::CP => (1, phase(theta)),
            StandardGate::CCX => (2, x()),
            StandardGate::CSwap => (1, swap()),
        };
        Ok(decomposed)
    }
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

fn x() -> Unitary {
    Unitary::from_rows([[ZERO, ONE], [ONE, ZERO]])
}

fn y() -> Unitary {
    Unitary::from_rows([[ZERO, c(0.0, -1.0)], [c(0.0, 1.0), ZERO]])
}

pub(crate) fn h() -> Unitary {
    let s = FRAC_1_SQRT_2;
    Unitary::from_rows([[c(s, 0.0), c(s, 0.0)], [c(s, 0.0), c(-s, 0.0)]])
}

/// diag(1, e^{iθ}).
pub(crate) fn phase(theta: f64) -> Unitary {
    Unitary::from_rows([[ONE, ZERO], [ZERO, Complex64::from_polar(1.0, theta)]])
}

fn rx(theta: f64) -> Unitary {
    let (s, co) = (theta / 2.0).sin_cos();
    Unitary::from_rows([[c(co, 0.0), c(0.0, -s)], [c(0.0, -s), c(co, 0.0)]])
}

fn ry(theta: f64) -> Unitary {
    let (s, co) = (theta / 2.0).sin_cos();
    Unitary::from_rows([[c(co, 0.0), c(-s, 0.0)], [c(s, 0.0), c(co, 0.0)]])
}

fn rz(theta: f64) -> Unitary {
    Unitary::from_rows([
        [Complex64::from_polar(1.0, -theta / 2.0), ZERO],
        [ZERO, Complex64::from_polar(1.0, theta / 2.0)],
    ])
}

/// U(θ, φ, λ) in the `OpenQASM` 3 convention.
pub(crate) fn u(theta: f64, phi: f64, lambda: f64) -> Unitary {
    let (s, co) = (theta / 2.0).sin_cos();
    Unitary::from_rows([
        [c(co, 0.0), -Complex64::from_polar(s, lambda)],
        [
            Complex64::from_polar(s, phi),
            Complex64::from_polar(co, phi + lambda),
        ],
    ])
}

fn swap() -> Unitary {
    Unitary::from_rows([
        [ONE, ZERO, ZERO, ZERO],
        [ZERO, ZERO, ONE, ZERO],
        [ZERO, ONE, ZERO, ZERO],
        [ZERO, ZERO, ZERO, ONE],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(StandardGate::from_name("H"), Some(StandardGate::H));
        assert_eq!(StandardGate::from_name("h"), Some(StandardGate::H));
        assert_eq!(StandardGate::from_name("CX"), Some(StandardGate::CX));
        assert_eq!(StandardGate::from_name("bell"), None);
    }

    #[test]
    fn test_standard_gate_properties() {
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::CCX.num_qubits(), 3);
        assert_eq!(StandardGate::U.num_params(), 3);
        assert_eq!(StandardGate::CP.num_params(), 1);
    }

    #[test]
    fn test_every_gate_is_unitary() {
        for gate in StandardGate::ALL {
            let params = vec![0.37; gate.num_params()];
            let (controls, unitary) = gate.decompose(&params).unwrap();
            assert!(unitary.is_unitary(), "{}", gate.name());
            assert_eq!(controls + unitary.num_qubits(), gate.num_qubits());
        }
    }

    #[test]
    fn test_wrong_param_count() {
        assert!(matches!(
            StandardGate::Rx.decompose(&[]),
            Err(HalError::InvalidGate(_))
        ));
        assert!(StandardGate::H.decompose(&[1.0]).is_err());
    }

    #[test]
    fn test_u_matches_named_gates() {
        use std::f64::consts::PI;
        assert!(u(PI, 0.0, PI).approx_eq(&x()));
        assert!(u(PI / 2.0, 0.0, PI).approx_eq(&h()));
        assert!(u(0.0, 0.0, PI / 2.0).approx_eq(&phase(PI / 2.0)));
    }
}
