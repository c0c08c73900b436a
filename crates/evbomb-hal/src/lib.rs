//! evbomb Hardware Abstraction Layer
//!
//! This crate provides the interface the bomb tester uses to execute
//! circuits, independent of what actually runs them.
//!
//! # Overview
//!
//! - A common [`Backend`] trait for job submission and management, with
//!   provided batch helpers
//! - [`Capabilities`] to describe backend features and constraints
//! - Unified result handling via [`ExecutionResult`] and [`Counts`]
//! - The [`BitOrder`] contract that pins how a result bit string maps onto
//!   classical-bit indices
//!
//! # Example: Running a Batch
//!
//! ```ignore
//! use evbomb_hal::Backend;
//! use evbomb_adapter_sim::SimulatorBackend;
//!
//! let backend = SimulatorBackend::with_seed(7);
//! let results = backend.run_batch(&circuits, 1).await?;
//! for result in &results {
//!     let (bits, _) = result.counts.most_frequent().unwrap();
//!     let first = result.bit_order.bit_at(bits, 0)?;
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, MAX_POLLS, POLL_INTERVAL,
    ValidationResult,
};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use result::{BitOrder, Counts, ExecutionResult};
