//! Statevector simulation engine.

use num_complex::Complex64;
use qasmi_hal::Unitary;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// A statevector representing a quantum state.
///
/// Bit `q` of an amplitude index is the state of qubit `q`.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The state amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Add `n` qubits in |0⟩ as the new most significant bits.
    ///
    /// The new qubits are zero in every existing basis state, so the old
    /// amplitudes keep their indices and the rest of the vector is zero.
    pub fn grow(&mut self, n: usize) {
        self.num_qubits += n;
        self.amplitudes.resize(1 << self.num_qubits, ZERO);
    }

    /// Apply `matrix` to `targets` on the subspace where every control holds
    /// its required value.
    ///
    /// Matrix indices read the targets big-endian: bit `k - 1 - j` of a
    /// matrix index is the state of `targets[j]`.
    pub fn apply_controlled(
        &mut self,
        matrix: &Unitary,
        controls: &[(usize, bool)],
        targets: &[usize],
    ) {
        let k = targets.len();
        let dim = 1 << k;

        let target_mask = targets.iter().fold(0, |m, &t| m | (1 << t));
        let ctrl_mask = controls.iter().fold(0, |m, &(q, _)| m | (1 << q));
        let ctrl_value = controls
            .iter()
            .filter(|(_, on)| *on)
            .fold(0, |m, &(q, _)| m | (1 << q));

        // Basis offset for every matrix index.
        let offsets: Vec<usize> = (0..dim)
            .map(|m| {
                targets
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| m & (1 << (k - 1 - j)) != 0)
                    .fold(0, |acc, (_, &t)| acc | (1 << t))
            })
            .collect();

        let mut local = vec![ZERO; dim];
        for base in 0..(1 << self.num_qubits) {
            if base & target_mask != 0 || base & ctrl_mask != ctrl_value {
                continue;
            }
            for (slot, offset) in local.iter_mut().zip(&offsets) {
                *slot = self.amplitudes[base | offset];
            }
            for (row, offset) in offsets.iter().enumerate() {
                let mut sum = ZERO;
                for (col, amp) in local.iter().enumerate() {
                    sum += matrix.get(row, col) * amp;
                }
                self.amplitudes[base | offset] = sum;
            }
        }
    }

    /// Probability that measuring `qubit` yields 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Project `qubit` onto `outcome` and renormalise.
    pub fn collapse(&mut self, qubit: usize, outcome: u8) {
        let mask = 1 << qubit;
        let keep = if outcome == 0 { 0 } else { mask };
        let mut norm_sq = 0.0;
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == keep {
                norm_sq += amp.norm_sqr();
            } else {
                *amp = ZERO;
            }
        }
        let norm = norm_sq.sqrt();
        if norm > 0.0 {
            for amp in &mut self.amplitudes {
                *amp /= norm;
            }
        }
    }

    /// Pauli-X on `qubit`.
    pub fn flip(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    /// Move every amplitude from index `i` to `f(i)`. `f` must be a
    /// permutation of the basis.
    pub fn permute(&mut self, f: impl Fn(usize) -> usize) {
        let mut next = vec![ZERO; self.amplitudes.len()];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            next[f(i)] = *amp;
        }
        self.amplitudes = next;
    }
}

/// Read `qubits` out of basis index `index` as a big-endian integer.
pub fn read_register(index: usize, qubits: &[usize]) -> u64 {
    qubits
        .iter()
        .fold(0, |acc, &q| (acc << 1) | ((index >> q) & 1) as u64)
}

/// Write `value` big-endian into the `qubits` bits of `index`.
pub fn write_register(index: usize, qubits: &[usize], value: u64) -> usize {
    let width = qubits.len();
    qubits.iter().enumerate().fold(index, |acc, (j, &q)| {
        if (value >> (width - 1 - j)) & 1 == 1 {
            acc | (1 << q)
        } else {
            acc & !(1 << q)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use qasmi_hal::StandardGate;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    fn gate(g: StandardGate) -> Unitary {
        g.decompose(&[]).unwrap().1
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_controlled(&gate(StandardGate::H), &[], &[0]);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_bell_state() {
        let mut sv = Statevector::new(2);
        sv.apply_controlled(&gate(StandardGate::H), &[], &[0]);
        sv.apply_controlled(&gate(StandardGate::X), &[(0, true)], &[1]);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_negative_control() {
        let mut sv = Statevector::new(2);
        sv.apply_controlled(&gate(StandardGate::X), &[(0, false)], &[1]);
        // Control qubit 0 is |0⟩, so the target flips: |q1 q0⟩ = |10⟩.
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_two_qubit_matrix_is_big_endian() {
        // |q1 q0⟩ = |01⟩, swap(0, 1) -> |10⟩.
        let mut sv = Statevector::new(2);
        sv.flip(0);
        sv.apply_controlled(&gate(StandardGate::Swap), &[], &[0, 1]);
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_grow_keeps_state() {
        let mut sv = Statevector::new(1);
        sv.flip(0);
        sv.grow(2);
        assert_eq!(sv.num_qubits(), 3);
        assert_eq!(sv.amplitudes().len(), 8);
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_collapse() {
        let mut sv = Statevector::new(1);
        sv.apply_controlled(&gate(StandardGate::H), &[], &[0]);
        assert!((sv.probability_one(0) - 0.5).abs() < 1e-10);

        sv.collapse(0, 1);
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(1.0, 0.0)));
        assert!((sv.probability_one(0) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_registers() {
        // Qubits 0..3, register [2, 1, 0] reads index 0b110 as 6.
        assert_eq!(read_register(0b110, &[2, 1, 0]), 6);
        assert_eq!(read_register(0b110, &[0, 1, 2]), 3);
        assert_eq!(write_register(0, &[2, 1, 0], 5), 0b101);
        assert_eq!(write_register(0b111, &[0, 1], 0b01), 0b110);
    }
}
