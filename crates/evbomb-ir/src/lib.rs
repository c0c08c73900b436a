//! evbomb Circuit Intermediate Representation
//!
//! This crate provides the data structures used to describe the small
//! circuits an Elitzur–Vaidman experiment submits to a backend: qubits and
//! classical bits, gates, instructions and a DAG-backed [`Circuit`] builder.
//!
//! # Overview
//!
//! Circuits are stored as a DAG (Directed Acyclic Graph) of operations
//! connected by quantum and classical wires. The builder API appends
//! operations in program order; backends read them back with
//! [`Circuit::instructions`], which yields a topological order that respects
//! every wire dependency, including mid-circuit measurements.
//!
//! # Example: One Tester Step
//!
//! ```rust
//! use evbomb_ir::{Circuit, ClbitId, QubitId};
//! use std::f64::consts::PI;
//!
//! let mut circuit = Circuit::with_size("step", 2, 2);
//! let (control, target) = (QubitId(0), QubitId(1));
//!
//! circuit
//!     .ry(PI, control).unwrap()
//!     .cx(control, target).unwrap()
//!     .measure(target, ClbitId(0)).unwrap()
//!     .measure(control, ClbitId(1)).unwrap();
//!
//! assert_eq!(circuit.num_qubits(), 2);
//! assert_eq!(circuit.dag().num_ops(), 4);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `X` | 1 | Pauli-X |
//! | `H` | 1 | Hadamard gate |
//! | `Ry` | 1 | Rotation around Y |
//! | `CX` | 2 | Controlled-NOT (CNOT) |

pub mod circuit;
pub mod dag;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use dag::{CircuitDag, DagEdge, DagNode, NodeIndex, WireId};
pub use error::{IrError, IrResult};
pub use gate::{Gate, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{Clbit, ClbitId, Qubit, QubitId};
