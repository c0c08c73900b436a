//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Gates with built-in semantics.
///
/// The set covers what the generator and tester circuits are built from:
/// a Hadamard coin, Y rotations on the control, and a CNOT coupling to the
/// target. Rotation angles are concrete radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Pauli-X gate.
    X,
    /// Hadamard gate.
    H,
    /// Rotation around Y axis.
    Ry(f64),
    /// Controlled-X (CNOT) gate. Operands are `[control, target]`.
    CX,
}

impl StandardGate {
    /// Lower-case mnemonic of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::H => "h",
            StandardGate::Ry(_) => "ry",
            StandardGate::CX => "cx",
        }
    }

    /// Number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX => 2,
            _ => 1,
        }
    }

    /// Rotation angle, for the parameterised gates.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Ry(theta) => Some(*theta),
            _ => None,
        }
    }
}

/// A gate with optional display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The gate itself.
    pub kind: StandardGate,
    /// Optional label for the gate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Gate {
    /// Wrap a standard gate.
    pub fn standard(gate: StandardGate) -> Self {
        Self {
            kind: gate,
            label: None,
        }
    }

    /// Attach a label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name of the gate.
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.kind.num_qubits()
    }
}

impl From<StandardGate> for Gate {
    fn from(gate: StandardGate) -> Self {
        Gate::standard(gate)
    }
}
