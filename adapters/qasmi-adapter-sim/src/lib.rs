//! qasmi Local Statevector Simulator
//!
//! The quantum state engine behind the interpreter. It keeps a full
//! statevector, so results are exact and memory grows as `2^n`.
//!
//! # Features
//!
//! - **Dynamic allocation**: qubits are added as registers are declared
//! - **Controlled unitaries**: any number of positive or negative controls
//! - **Seedable measurement**: same seed, same outcomes
//! - **CMODEXP2**: modular exponentiation as a basis permutation
//!
//! # Performance
//!
//! | Qubits | Memory |
//! |--------|--------|
//! | 10 | ~16 KB |
//! | 15 | ~512 KB |
//! | 20 | ~16 MB |
//! | 24 | ~256 MB |
//!
//! # Example
//!
//! ```
//! use qasmi_adapter_sim::StatevectorBackend;
//! use qasmi_hal::{Backend, Operation, StandardGate};
//!
//! let mut backend = StatevectorBackend::with_seed(42);
//! let q = backend.allocate(1).unwrap();
//! let (_, x) = StandardGate::X.decompose(&[]).unwrap();
//! backend.apply(&Operation::new(x, q.clone())).unwrap();
//! assert_eq!(backend.measure(q[0]).unwrap(), 1);
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, StatevectorBackend};
