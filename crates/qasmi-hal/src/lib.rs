//! qasmi Hardware Abstraction Layer
//!
//! The interface between the evaluator and a quantum state engine:
//!
//! - [`Backend`]: allocate qubits, apply controlled unitaries, measure, reset
//!   and inspect amplitudes
//! - [`Operation`] and [`Control`]: one controlled unitary application
//! - [`Unitary`]: dense gate matrices with adjoint and integer powers
//! - [`StandardGate`]: the named gate table (`h`, `cx`, `rz`, `ccx`, ...)
//!
//! # Example
//!
//! ```ignore
//! use qasmi_hal::{Backend, Control, Operation, StandardGate};
//!
//! let qubits = backend.allocate(2)?;
//! let (_, h) = StandardGate::H.decompose(&[])?;
//! backend.apply(&Operation::new(h, vec![qubits[0]]))?;
//!
//! let (controls, x) = StandardGate::CX.decompose(&[])?;
//! assert_eq!(controls, 1);
//! backend.apply(&Operation::new(x, vec![qubits[1]]).with_controls([Control::on(qubits[0])]))?;
//! ```

pub mod backend;
pub mod error;
pub mod gate;
pub mod qubit;
pub mod unitary;

pub use backend::{Backend, Control, Operation};
pub use error::{HalError, HalResult};
pub use gate::StandardGate;
pub use qubit::QubitId;
pub use unitary::Unitary;
