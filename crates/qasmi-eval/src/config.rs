//! Evaluator configuration.

use serde::{Deserialize, Serialize};

/// Default limit on nested gate and subroutine calls.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default limit on the statements a modified gate body may expand to.
pub const DEFAULT_MAX_UNROLL: usize = 100_000;

/// Default simulator capacity.
pub const DEFAULT_MAX_QUBITS: usize = qasmi_adapter_sim::DEFAULT_MAX_QUBITS;

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Maximum depth of nested gate/subroutine calls.
    pub max_depth: usize,
    /// Measurement seed. `None` seeds from system entropy.
    pub seed: Option<u64>,
    /// Maximum number of simulated qubits.
    pub max_qubits: usize,
    /// Maximum length of a gate body after `pow` expansion.
    pub max_unroll: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            seed: None,
            max_qubits: DEFAULT_MAX_QUBITS,
            max_unroll: DEFAULT_MAX_UNROLL,
        }
    }
}

impl EvalConfig {
    /// Set the call depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Fix the measurement seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the simulator capacity.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Set the gate body expansion limit.
    #[must_use]
    pub fn with_max_unroll(mut self, max_unroll: usize) -> Self {
        self.max_unroll = max_unroll;
        self
    }
}
