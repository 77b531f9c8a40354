//! Qubit handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a qubit allocated by a backend.
///
/// Backends number qubits densely from zero in allocation order; the id is
/// also the qubit's bit position in the amplitude index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// Bit position of this qubit in a basis-state index.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_index() {
        let q = QubitId::from(3);
        assert_eq!(q.to_string(), "q3");
        assert_eq!(q.index(), 3);
    }
}
