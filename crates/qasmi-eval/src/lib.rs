//! Tree-walking evaluator for qasmi
//!
//! Programs parsed by `qasmi-qasm3` run here against any [`qasmi_hal::Backend`],
//! by default the statevector simulator from `qasmi-adapter-sim`.
//!
//! - [`Environ`]: the scope chain of registers, constants and definitions
//! - [`Evaluator`]: statement dispatch, gate modifiers, gate and subroutine calls
//! - [`Const`] and [`Value`]: classical results
//! - [`Snapshot`]: register contents and amplitudes recorded by `print`
//!
//! # Example
//!
//! ```rust
//! use qasmi_eval::{EvalConfig, Evaluator};
//! use qasmi_qasm3::parse;
//!
//! let program = parse(
//!     "
//!     qubit[2] q;
//!     bit[2] c;
//!     gate bell a, b { h a; cx a, b; }
//!     bell q[0], q[1];
//!     c = measure q;
//!     ",
//! )
//! .unwrap();
//!
//! let mut evaluator = Evaluator::with_config(EvalConfig::default().with_seed(7));
//! evaluator.eval_program(&program).unwrap();
//!
//! // The two halves of a Bell pair always agree.
//! let c = evaluator.environ().bit.register("c").unwrap();
//! assert_eq!(c[0], c[1]);
//! ```
//!
//! # Modifiers
//!
//! Modifiers are written outermost first and apply innermost first, so
//! `ctrl @ inv @ g c, t` is the controlled form of `g`'s inverse. The first
//! qubit arguments of an application are the control qubits of its `ctrl`
//! and `negctrl` modifiers, in modifier order.

pub mod config;
pub mod environ;
pub mod error;
pub mod evaluator;
pub mod object;
pub mod snapshot;

pub use config::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_QUBITS, DEFAULT_MAX_UNROLL, EvalConfig};
pub use environ::{Environ, RegisterTable, normalize_index};
pub use error::{EvalError, EvalResult};
pub use evaluator::Evaluator;
pub use object::{Const, Value};
pub use snapshot::{BasisState, BitRegister, QubitRegister, Snapshot};
