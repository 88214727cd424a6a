//! Global qubit and classical bit identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global identifier of a qubit.
///
/// Identifiers are dense, zero-based and immutable after compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q[{}]", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

impl From<usize> for QubitId {
    fn from(id: usize) -> Self {
        QubitId(u32::try_from(id).expect("qubit id exceeds u32::MAX"))
    }
}

/// Global identifier of a classical bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitId(pub u32);

impl BitId {
    /// The id as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c[{}]", self.0)
    }
}

impl From<u32> for BitId {
    fn from(id: u32) -> Self {
        BitId(id)
    }
}

impl From<usize> for BitId {
    fn from(id: usize) -> Self {
        BitId(u32::try_from(id).expect("bit id exceeds u32::MAX"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", QubitId(3)), "q[3]");
        assert_eq!(format!("{}", BitId(0)), "c[0]");
    }

    #[test]
    fn test_from_usize() {
        let q: QubitId = 7usize.into();
        assert_eq!(q, QubitId(7));
        assert_eq!(q.index(), 7);
    }
}
