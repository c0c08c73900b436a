//! Error types for bomb experiments.

use thiserror::Error;

use evbomb_hal::HalError;
use evbomb_ir::IrError;

use crate::bomb::BombId;

/// Errors raised while generating, testing or classifying bombs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BombError {
    /// Circuit construction failed.
    #[error("Circuit error: {0}")]
    Ir(#[from] IrError),

    /// The backend failed; runs are not retried.
    #[error("Backend error: {0}")]
    Hal(#[from] HalError),

    /// Step count below one.
    #[error("Step count must be at least 1, got {0}")]
    InvalidSteps(u32),

    /// Rotation angle is NaN or infinite.
    #[error("Rotation angle must be finite, got {0}")]
    InvalidEpsilon(f64),

    /// A backend result did not contain the expected measurement.
    #[error("Missing measurement for {bomb}: {detail}")]
    MissingMeasurement {
        /// Bomb whose result was incomplete.
        bomb: BombId,
        /// What was missing.
        detail: String,
    },

    /// The backend returned a different number of results than circuits.
    #[error("Expected {expected} results from the backend, got {got}")]
    ResultCountMismatch {
        /// Circuits submitted.
        expected: usize,
        /// Results received.
        got: usize,
    },

    /// A register could not be parsed.
    #[error("Invalid register '{0}': expected only '0' and '1'")]
    InvalidRegister(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON export failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for bomb experiments.
pub type BombResult<T> = Result<T, BombError>;
