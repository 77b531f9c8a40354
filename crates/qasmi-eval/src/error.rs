//! Error types for evaluation.

use qasmi_hal::HalError;
use thiserror::Error;

/// Errors that can occur while evaluating a program.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Name not bound in any visible scope.
    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),

    /// Register index outside `[-len, len)`.
    #[error("Index {index} out of range for register '{register}' of size {size}")]
    IndexOutOfRange {
        register: String,
        index: i64,
        size: usize,
    },

    /// Wrong number of qubit or classical arguments.
    #[error("'{name}' expects {expected} {what}, got {got}")]
    ArityMismatch {
        name: String,
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Registers of different sizes in one broadcast or assignment.
    #[error("Size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// No user definition or standard gate with this name.
    #[error("Unknown gate or subroutine: {0}")]
    UnknownGate(String),

    /// Value of the wrong kind for its use.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Integer division or remainder by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer arithmetic outside the `i64` range.
    #[error("Integer overflow in {0}")]
    Overflow(String),

    /// Modifier that cannot apply to this call.
    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    /// Declaration that is only legal in the global scope.
    #[error("'{0}' may only be declared in the global scope")]
    IllegalDeclaration(String),

    /// Assignment to a name bound by `const`.
    #[error("Cannot assign to constant '{0}'")]
    AssignToConst(String),

    /// Statement or expression the evaluator does not execute here.
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    /// Call to a definition that is already being evaluated.
    #[error("Recursive call to '{0}'")]
    Recursion(String),

    /// Nested calls deeper than the configured limit.
    #[error("Call depth exceeds the limit of {0}")]
    RecursionLimit(usize),

    /// Gate body that would grow past the configured limit under `pow`.
    #[error("Expanding '{name}' exceeds the limit of {limit} statements")]
    UnrollLimit { name: String, limit: usize },

    /// Backend error.
    #[error("Backend error: {0}")]
    Backend(#[from] HalError),

    /// An error raised by a top-level statement, with its canonical text.
    #[error("{source}\n  in: {stmt}")]
    Statement {
        stmt: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// The error without statement context.
    pub fn root(&self) -> &EvalError {
        match self {
            EvalError::Statement { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;
