//! evbomb Local Statevector Simulator
//!
//! A small exact simulator for the two-qubit circuits of the bomb tester
//! and the one-qubit circuits of the bomb generator.
//!
//! # Features
//!
//! - Full statevector representation with exact gate application
//! - Mid-circuit measurement with state collapse
//! - Seedable sampling via [`SimulatorBackend::with_seed`]
//! - Optional symmetric readout error
//!
//! # Example
//!
//! ```ignore
//! use evbomb_adapter_sim::SimulatorBackend;
//! use evbomb_hal::Backend;
//!
//! let backend = SimulatorBackend::with_seed(7);
//! let job_id = backend.submit(&circuit, 1).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

mod simulator;
mod statevector;

pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};
pub use statevector::Statevector;
