//! Elitzur–Vaidman bomb testing
//!
//! This crate runs the interaction-free measurement protocol against any
//! [`evbomb_hal::Backend`]:
//!
//! - **Generator** ([`generate_bombs`]): one Hadamard coin per bomb decides
//!   whether it is live or a dud.
//! - **Tester** ([`tester_circuit`], [`test_bombs`]): a control qubit is
//!   rotated by ε in `S` steps while a target qubit, coupled to it only by a
//!   live bomb, is read after every step.
//! - **Classifier** ([`classify`]): a target reading of 1 means the bomb
//!   went off; otherwise the final control bit tells dud (1) from live (0).
//!
//! [`Experiment`] strings the three together and produces an
//! [`ExperimentReport`] with per-bomb [`BombRecord`]s and derived rates.
//!
//! # Example
//!
//! ```ignore
//! use evbomb_adapter_sim::SimulatorBackend;
//! use evbomb_core::{Experiment, ExperimentConfig};
//!
//! let backend = SimulatorBackend::with_seed(42);
//! let config = ExperimentConfig { bombs: 1000, steps: 20, ..Default::default() };
//! let report = Experiment::new(config, &backend)?.run().await?;
//!
//! println!("detonated: {}", report.tally.detonated);
//! println!("expected rate: {:.3}", report.expected_detonation_rate());
//! ```

pub mod bomb;
pub mod classifier;
pub mod config;
pub mod error;
pub mod experiment;
pub mod register;
pub mod report;
pub mod tester;

pub use bomb::{Bomb, BombId, generate_bombs, generator_circuit};
pub use classifier::{Outcome, classify, classify_bits};
pub use config::ExperimentConfig;
pub use error::{BombError, BombResult};
pub use experiment::{Experiment, Observer};
pub use register::MeasurementRegister;
pub use report::{
    BombRecord, Confusion, ExperimentReport, OutcomeTally, expected_detonation_probability,
};
pub use tester::{CONTROL, TARGET, TesterParams, default_epsilon, test_bombs, tester_circuit};
