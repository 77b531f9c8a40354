//! Simulator backend implementation.

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use qasmi_hal::{Backend, Control, HalError, HalResult, Operation, QubitId};

use crate::statevector::{Statevector, read_register, write_register};

/// Default capacity: 2^24 amplitudes is 256 MiB of state.
pub const DEFAULT_MAX_QUBITS: usize = 24;

/// Local statevector backend.
///
/// Qubits are allocated on demand by growing the state vector. Measurement
/// samples with a seedable random number generator, so runs with the same
/// seed are reproducible.
pub struct StatevectorBackend {
    state: Statevector,
    rng: StdRng,
    max_qubits: usize,
}

impl StatevectorBackend {
    /// Create a backend with no qubits, seeded from system entropy.
    pub fn new() -> Self {
        Self {
            state: Statevector::new(0),
            rng: StdRng::from_entropy(),
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Create a backend whose measurements are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    /// Set the maximum number of qubits.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Maximum number of qubits supported.
    pub fn max_qubits(&self) -> usize {
        self.max_qubits
    }

    /// Probability that measuring `qubit` yields 1, without collapsing.
    pub fn probability_one(&self, qubit: QubitId) -> HalResult<f64> {
        let q = self.check(qubit)?;
        Ok(self.state.probability_one(q))
    }

    fn check(&self, qubit: QubitId) -> HalResult<usize> {
        let q = qubit.index();
        if q < self.state.num_qubits() {
            Ok(q)
        } else {
            Err(HalError::InvalidQubit(qubit))
        }
    }

    fn check_all(&self, qubits: &[QubitId]) -> HalResult<Vec<usize>> {
        let mut checked = Vec::with_capacity(qubits.len());
        for &qubit in qubits {
            let q = self.check(qubit)?;
            if checked.contains(&q) {
                return Err(HalError::DuplicateQubit(qubit));
            }
            checked.push(q);
        }
        Ok(checked)
    }
}

impl Default for StatevectorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for StatevectorBackend {
    fn name(&self) -> &str {
        "statevector"
    }

    fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    fn allocate(&mut self, n: usize) -> HalResult<Vec<QubitId>> {
        let allocated = self.state.num_qubits();
        if allocated + n > self.max_qubits {
            return Err(HalError::CapacityExceeded {
                requested: n,
                allocated,
                max: self.max_qubits,
            });
        }
        let mut ids = Vec::with_capacity(n);
        for q in allocated..allocated + n {
            let id = u32::try_from(q).map_err(|_| HalError::CapacityExceeded {
                requested: n,
                allocated,
                max: self.max_qubits,
            })?;
            ids.push(QubitId(id));
        }
        self.state.grow(n);
        debug!(n, total = self.state.num_qubits(), "allocated qubits");
        Ok(ids)
    }

    fn apply(&mut self, op: &Operation) -> HalResult<()> {
        op.validate()?;
        let targets = self.check_all(&op.targets)?;
        let mut controls = Vec::with_capacity(op.controls.len());
        for &Control { qubit, on } in &op.controls {
            controls.push((self.check(qubit)?, on));
        }
        trace!(?targets, ?controls, "apply");
        self.state
            .apply_controlled(&op.matrix, &controls, &targets);
        Ok(())
    }

    fn measure(&mut self, qubit: QubitId) -> HalResult<u8> {
        let q = self.check(qubit)?;
        let p1 = self.state.probability_one(q);
        let r: f64 = self.rng.r#gen();
        let outcome = u8::from(r < p1);
        self.state.collapse(q, outcome);
        trace!(%qubit, p1, outcome, "measure");
        Ok(outcome)
    }

    fn reset(&mut self, qubit: QubitId) -> HalResult<()> {
        let q = self.check(qubit)?;
        if self.measure(qubit)? == 1 {
            self.state.flip(q);
        }
        trace!(%qubit, "reset");
        Ok(())
    }

    fn amplitudes(&self) -> Vec<Complex64> {
        self.state.amplitudes().to_vec()
    }

    fn cmodexp2(
        &mut self,
        a: u64,
        n: u64,
        control: &[QubitId],
        target: &[QubitId],
    ) -> HalResult<()> {
        let all: Vec<QubitId> = control.iter().chain(target).copied().collect();
        self.check_all(&all)?;
        let control: Vec<usize> = control.iter().map(|q| q.index()).collect();
        let target: Vec<usize> = target.iter().map(|q| q.index()).collect();

        if n == 0 {
            return Err(HalError::InvalidOperation("CMODEXP2 modulus is zero".into()));
        }
        if target.len() < 64 && n > 1_u64 << target.len() {
            return Err(HalError::InvalidOperation(format!(
                "CMODEXP2 modulus {n} does not fit in {} target qubit(s)",
                target.len()
            )));
        }
        if gcd(a, n) != 1 {
            return Err(HalError::InvalidOperation(format!(
                "CMODEXP2 requires gcd(a, N) = 1, got gcd({a}, {n}) = {}",
                gcd(a, n)
            )));
        }

        debug!(a, n, "cmodexp2");
        self.state.permute(|index| {
            let x = read_register(index, &control);
            let y = read_register(index, &target);
            if y >= n {
                return index;
            }
            let y = mul_mod(pow_mod(a, x, n), y, n);
            write_register(index, &target, y)
        });
        Ok(())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[allow(clippy::cast_possible_truncation)]
fn mul_mod(a: u64, b: u64, n: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(n)) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, n: u64) -> u64 {
    let mut result = 1 % n;
    base %= n;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, n);
        }
        base = mul_mod(base, base, n);
        exp >>= 1;
    }
    result
}
