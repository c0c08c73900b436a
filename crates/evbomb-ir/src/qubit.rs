//! Qubit and classical bit types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The qubit index as a `usize`, for addressing statevector bits.
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

/// Index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl ClbitId {
    /// The bit index as a `usize`, for addressing result registers.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// A quantum bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qubit {
    /// The circuit-wide index.
    pub id: QubitId,
    /// Register name and position, if declared through a register.
    pub register: Option<(String, u32)>,
}

impl Qubit {
    /// Create an anonymous qubit.
    pub fn new(id: QubitId) -> Self {
        Self { id, register: None }
    }

    /// Create a qubit belonging to a named register.
    pub fn with_register(id: QubitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some((register.into(), index)),
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.register {
            Some((reg, idx)) => write!(f, "{reg}[{idx}]"),
            None => write!(f, "{}", self.id),
        }
    }
}

/// A classical bit with optional register membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Clbit {
    /// The circuit-wide index.
    pub id: ClbitId,
    /// Register name and position, if declared through a register.
    pub register: Option<(String, u32)>,
}

impl Clbit {
    /// Create an anonymous classical bit.
    pub fn new(id: ClbitId) -> Self {
        Self { id, register: None }
    }

    /// Create a classical bit belonging to a named register.
    pub fn with_register(id: ClbitId, register: impl Into<String>, index: u32) -> Self {
        Self {
            id,
            register: Some((register.into(), index)),
        }
    }
}

impl fmt::Display for Clbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.register {
            Some((reg, idx)) => write!(f, "{reg}[{idx}]"),
            None => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubit_display() {
        assert_eq!(Qubit::new(QubitId(0)).to_string(), "q0");
        assert_eq!(
            Qubit::with_register(QubitId(1), "control", 0).to_string(),
            "control[0]"
        );
    }

    #[test]
    fn test_clbit_display() {
        assert_eq!(Clbit::new(ClbitId(3)).to_string(), "c3");
        assert_eq!(
            Clbit::with_register(ClbitId(4), "target", 2).to_string(),
            "target[2]"
        );
    }

    #[test]
    fn test_index_conversion() {
        assert_eq!(QubitId(5).index(), 5);
        assert_eq!(ClbitId::from(7).index(), 7);
    }
}
