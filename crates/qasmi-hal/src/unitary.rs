//! Dense unitary matrices.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{HalError, HalResult};

const TOLERANCE: f64 = 1e-9;

/// A `2^k x 2^k` unitary matrix acting on `k` target qubits.
///
/// Row and column indices read the targets big-endian: bit `k - 1 - j` of an
/// index is the state of `targets[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unitary {
    matrix: Array2<Complex64>,
}

impl Unitary {
    /// Wrap a matrix, checking that it is square with a power-of-two side
    /// and unitary.
    pub fn new(matrix: Array2<Complex64>) -> HalResult<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols || !rows.is_power_of_two() {
            return Err(HalError::InvalidUnitary(format!(
                "expected a square power-of-two matrix, got {rows}x{cols}"
            )));
        }
        let unitary = Self { matrix };
        if !unitary.is_unitary() {
            return Err(HalError::InvalidUnitary("U * U^dagger != I".into()));
        }
        Ok(unitary)
    }

    /// Build a matrix from rows, for the fixed gate table.
    pub(crate) fn from_rows<const N: usize>(rows: [[Complex64; N]; N]) -> Self {
        let matrix = Array2::from_shape_fn((N, N), |(r, c)| rows[r][c]);
        Self { matrix }
    }

    /// Identity on `num_qubits` qubits.
    pub fn identity(num_qubits: usize) -> Self {
        let dim = 1 << num_qubits;
        Self {
            matrix: Array2::from_shape_fn((dim, dim), |(r, c)| {
                if r == c {
                    Complex64::new(1.0, 0.0)
                } else {
                    Complex64::new(0.0, 0.0)
                }
            }),
        }
    }

    /// The underlying matrix.
    pub fn matrix(&self) -> &Array2<Complex64> {
        &self.matrix
    }

    /// Side length of the matrix.
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of qubits the matrix acts on.
    pub fn num_qubits(&self) -> usize {
        self.dim().trailing_zeros() as usize
    }

    /// Matrix element.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[[row, col]]
    }

    /// Conjugate transpose.
    #[must_use]
    pub fn adjoint(&self) -> Self {
        Self {
            matrix: self.matrix.t().mapv(|z| z.conj()),
        }
    }

    /// Matrix product `self * other`.
    pub fn dot(&self, other: &Unitary) -> HalResult<Self> {
        if self.dim() != other.dim() {
            return Err(HalError::InvalidUnitary(format!(
                "cannot multiply {0}x{0} by {1}x{1}",
                self.dim(),
                other.dim()
            )));
        }
        Ok(Self {
            matrix: self.matrix.dot(&other.matrix),
        })
    }

    /// Integer power; negative exponents raise the adjoint.
    #[must_use]
    pub fn pow(&self, exponent: i64) -> Self {
        let mut base = if exponent < 0 {
            self.adjoint()
        } else {
            self.clone()
        };
        let mut n = exponent.unsigned_abs();
        let mut result = Self::identity(self.num_qubits());
        while n > 0 {
            if n & 1 == 1 {
                result.matrix = result.matrix.dot(&base.matrix);
            }
            base.matrix = base.matrix.dot(&base.matrix);
            n >>= 1;
        }
        result
    }

    /// True when `U * U^dagger` is the identity within tolerance.
    pub fn is_unitary(&self) -> bool {
        let product = self.matrix.dot(&self.adjoint().matrix);
        product.indexed_iter().all(|((r, c), z)| {
            let expected = if r == c { 1.0 } else { 0.0 };
            (z - Complex64::new(expected, 0.0)).norm() < TOLERANCE
        })
    }

    /// Element-wise comparison within tolerance.
    pub fn approx_eq(&self, other: &Unitary) -> bool {
        self.dim() == other.dim()
            && self
                .matrix
                .iter()
                .zip(other.matrix.iter())
                .all(|(a, b)| (a - b).norm() < TOLERANCE)
    }
}
