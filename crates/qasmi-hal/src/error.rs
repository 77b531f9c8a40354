//! Error types for the HAL crate.

use thiserror::Error;

use crate::qubit::QubitId;

/// Errors that can occur in backend operations.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum HalError {
    /// Allocation would exceed the backend's qubit capacity.
    #[error("Cannot allocate {requested} qubits: backend holds {allocated} of at most {max}")]
    CapacityExceeded {
        requested: usize,
        allocated: usize,
        max: usize,
    },

    /// A qubit the backend never allocated.
    #[error("Unknown qubit: {0}")]
    InvalidQubit(QubitId),

    /// The same qubit appears twice in one operation.
    #[error("Qubit {0} used more than once in one operation")]
    DuplicateQubit(QubitId),

    /// Matrix is not square, not a power of two, or not unitary.
    #[error("Invalid unitary: {0}")]
    InvalidUnitary(String),

    /// Operation shape does not match its matrix.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Unknown standard gate or wrong parameter count.
    #[error("Invalid gate: {0}")]
    InvalidGate(String),

    /// Unsupported feature.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for HAL operations.
pub type HalResult<T> = Result<T, HalError>;
