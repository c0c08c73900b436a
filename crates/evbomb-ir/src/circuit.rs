//! High-level circuit builder API.

use rustc_hash::FxHashMap;
use std::fmt;

use crate::dag::CircuitDag;
use crate::error::IrResult;
use crate::gate::StandardGate;
use crate::instruction::Instruction;
use crate::qubit::{Clbit, ClbitId, Qubit, QubitId};

/// A quantum circuit.
///
/// Gates and measurements are appended through chained builder methods,
/// each of which validates its operands against the declared wires.
#[derive(Debug, Clone)]
pub struct Circuit {
    name: String,
    qubits: Vec<Qubit>,
    clbits: Vec<Clbit>,
    dag: CircuitDag,
}

impl Circuit {
    /// Create a new empty circuit.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qubits: vec![],
            clbits: vec![],
            dag: CircuitDag::new(),
        }
    }

    /// Create a circuit with a given number of qubits and classical bits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32, num_clbits: u32) -> Self {
        let mut circuit = Self::new(name);
        for _ in 0..num_qubits {
            circuit.add_qubit();
        }
        for _ in 0..num_clbits {
            circuit.add_clbit();
        }
        circuit
    }

    fn next_qubit_id(&self) -> QubitId {
        QubitId(self.qubits.len() as u32)
    }

    fn next_clbit_id(&self) -> ClbitId {
        ClbitId(self.clbits.len() as u32)
    }

    /// Add a single qubit.
    pub fn add_qubit(&mut self) -> QubitId {
        let id = self.next_qubit_id();
        self.qubits.push(Qubit::new(id));
        self.dag.add_qubit(id);
        id
    }

    /// Add a named quantum register.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> Vec<QubitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = self.next_qubit_id();
                self.qubits.push(Qubit::with_register(id, &name, i));
                self.dag.add_qubit(id);
                id
            })
            .collect()
    }

    /// Add a single classical bit.
    pub fn add_clbit(&mut self) -> ClbitId {
        let id = self.next_clbit_id();
        self.clbits.push(Clbit::new(id));
        self.dag.add_clbit(id);
        id
    }

    /// Add a named classical register.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> Vec<ClbitId> {
        let name = name.into();
        (0..size)
            .map(|i| {
                let id = self.next_clbit_id();
                self.clbits.push(Clbit::with_register(id, &name, i));
                self.dag.add_clbit(id);
                id
            })
            .collect()
    }

    fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.dag.apply(instruction)?;
        Ok(self)
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Ry rotation.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::two_qubit_gate(StandardGate::CX, control, target))
    }

    // =========================================================================
    // Non-unitary operations
    // =========================================================================

    /// Measure a qubit into a classical bit. May appear mid-circuit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> IrResult<&mut Self> {
        self.push(Instruction::measure(qubit, clbit))
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.push(Instruction::reset(qubit))
    }

    /// Add a barrier on the given qubits.
    pub fn barrier(&mut self, qubits: impl IntoIterator<Item = QubitId>) -> IrResult<&mut Self> {
        self.push(Instruction::barrier(qubits))
    }

    /// Add a barrier on every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        let all: Vec<QubitId> = self.qubits.iter().map(|q| q.id).collect();
        self.barrier(all)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.qubits.len()
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.clbits.len()
    }

    /// Circuit depth.
    pub fn depth(&self) -> usize {
        self.dag.depth()
    }

    /// Declared qubits.
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// Declared classical bits.
    pub fn clbits(&self) -> &[Clbit] {
        &self.clbits
    }

    /// Underlying DAG.
    pub fn dag(&self) -> &CircuitDag {
        &self.dag
    }

    /// Instructions in an order that respects every wire dependency.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.dag.topological_ops().map(|(_, inst)| inst)
    }

    /// Whether any instruction is a measurement.
    pub fn has_measurements(&self) -> bool {
        self.instructions().any(Instruction::is_measure)
    }

    /// Count of each operation by name.
    pub fn count_ops(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for inst in self.instructions() {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "circuit {} ({} qubits, {} clbits)",
            self.name,
            self.num_qubits(),
            self.num_clbits()
        )?;
        for inst in self.instructions() {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrError;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_with_size() {
        let circuit = Circuit::with_size("empty", 2, 3);
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_clbits(), 3);
        assert_eq!(circuit.depth(), 0);
        assert!(!circuit.has_measurements());
    }

    #[test]
    fn test_registers() {
        let mut circuit = Circuit::new("regs");
        let q = circuit.add_qreg("bomb", 2);
        let c = circuit.add_creg("target", 3);
        assert_eq!(q, vec![QubitId(0), QubitId(1)]);
        assert_eq!(c, vec![ClbitId(0), ClbitId(1), ClbitId(2)]);
        assert_eq!(circuit.qubits()[1].to_string(), "bomb[1]");
        assert_eq!(circuit.clbits()[2].to_string(), "target[2]");
    }

    #[test]
    fn test_coin_circuit() {
        let mut circuit = Circuit::with_size("coin", 1, 1);
        circuit.h(QubitId(0)).unwrap().measure(QubitId(0), ClbitId(0)).unwrap();

        let names: Vec<_> = circuit.instructions().map(Instruction::name).collect();
        assert_eq!(names, ["h", "measure"]);
        assert!(circuit.has_measurements());
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_count_ops() {
        let mut circuit = Circuit::with_size("count", 2, 2);
        for step in 0..2 {
            circuit
                .ry(PI / 2.0, QubitId(0))
                .unwrap()
                .cx(QubitId(0), QubitId(1))
                .unwrap()
                .measure(QubitId(1), ClbitId(step))
                .unwrap();
        }
        let counts = circuit.count_ops();
        assert_eq!(counts["ry"], 2);
        assert_eq!(counts["cx"], 2);
        assert_eq!(counts["measure"], 2);
    }

    #[test]
    fn test_builder_error_propagates() {
        let mut circuit = Circuit::with_size("bad", 1, 0);
        let err = circuit.measure(QubitId(0), ClbitId(0)).unwrap_err();
        assert!(matches!(err, IrError::ClbitNotFound { .. }));

        let err = circuit.ry(f64::INFINITY, QubitId(0)).unwrap_err();
        assert!(matches!(err, IrError::NonFiniteAngle { .. }));
    }

    #[test]
    fn test_barrier_all_and_display() {
        let mut circuit = Circuit::with_size("show", 2, 1);
        circuit
            .x(QubitId(0))
            .unwrap()
            .barrier_all()
            .unwrap()
            .measure(QubitId(1), ClbitId(0))
            .unwrap();
        let text = circuit.to_string();
        assert!(text.starts_with("circuit show (2 qubits, 1 clbits)"));
        assert!(text.contains("  barrier q0, q1"));
        assert!(text.contains("  measure q1 -> c0"));
    }

    #[test]
    fn test_instruction_serializes() {
        let mut circuit = Circuit::with_size("json", 1, 0);
        circuit.ry(0.5, QubitId(0)).unwrap();
        let inst = circuit.instructions().next().unwrap();
        let json = serde_json::to_string(inst).unwrap();
        let back: Instruction = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, inst);
    }

    proptest! {
        #[test]
        fn prop_depth_bounded_by_ops(ops in prop::collection::vec(0u8..4, 0..40)) {
            let mut circuit = Circuit::with_size("random", 2, 1);
            for op in &ops {
                match op {
                    0 => { circuit.h(QubitId(0)).unwrap(); }
                    1 => { circuit.ry(0.3, QubitId(1)).unwrap(); }
                    2 => { circuit.cx(QubitId(0), QubitId(1)).unwrap(); }
                    _ => { circuit.measure(QubitId(1), ClbitId(0)).unwrap(); }
                }
            }
            prop_assert_eq!(circuit.dag().num_ops(), ops.len());
            prop_assert!(circuit.depth() <= ops.len());
            prop_assert!(circuit.dag().verify_integrity().is_ok());
        }
    }
}
