//! The bomb tester circuit.
//!
//! Qubit 0 is the control, qubit 1 the target that a live bomb absorbs.
//! Each of the `S` steps rotates the control by ε, couples the target to it
//! when the bomb is live, and reads the target into classical bit `step`.
//! The control is read last, into classical bit `S`.
//!
//! ```text
//!  control ─ Ry(ε) ─■─────── ... ─ Ry(ε) ─■──────── M → c[S]
//!                   │                      │
//!  target  ────────X─ M → c[0] ... ───────X─ M → c[S-1]
//! ```
//!
//! For a dud the coupling is absent, so `S` rotations of π/S take the
//! control to |1⟩ with certainty. For a live bomb every target reading
//! collapses the control back to |0⟩ unless the bomb explodes, which
//! happens with probability `1 - cos^{2S}(ε/2)` over the whole run.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::{debug, instrument};

use evbomb_hal::Backend;
use evbomb_ir::{Circuit, ClbitId, QubitId};

use crate::bomb::Bomb;
use crate::error::{BombError, BombResult};
use crate::register::MeasurementRegister;

/// Control qubit, rotated every step.
pub const CONTROL: QubitId = QubitId(0);

/// Target qubit, flipped by a live bomb.
pub const TARGET: QubitId = QubitId(1);

/// Rotation per step that completes a half turn after `steps` steps.
pub fn default_epsilon(steps: u32) -> f64 {
    PI / f64::from(steps)
}

/// Step count and rotation angle of a tester run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TesterParams {
    steps: u32,
    epsilon: f64,
}

impl TesterParams {
    /// Validate `steps >= 1` and a finite angle; `None` picks π/steps.
    pub fn new(steps: u32, epsilon: Option<f64>) -> BombResult<Self> {
        if steps == 0 {
            return Err(BombError::InvalidSteps(steps));
        }
        let epsilon = epsilon.unwrap_or_else(|| default_epsilon(steps));
        if !epsilon.is_finite() {
            return Err(BombError::InvalidEpsilon(epsilon));
        }
        Ok(Self { steps, epsilon })
    }

    /// Number of rotate-couple-measure steps.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Rotation angle per step, in radians.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Bits per register: one per step plus the final control reading.
    pub fn register_len(&self) -> usize {
        self.steps as usize + 1
    }
}

/// Build the tester circuit for one bomb.
pub fn tester_circuit(bomb: &Bomb, params: &TesterParams) -> BombResult<Circuit> {
    let steps = params.steps();
    let num_clbits = steps
        .checked_add(1)
        .ok_or(BombError::InvalidSteps(steps))?;
    let mut circuit = Circuit::with_size(format!("tester_{}", bomb.id.0), 2, num_clbits);

    for step in 0..steps {
        circuit.ry(params.epsilon(), CONTROL)?;
        if bomb.is_live {
            circuit.cx(CONTROL, TARGET)?;
        }
        circuit.measure(TARGET, ClbitId(step))?;
    }
    circuit.measure(CONTROL, ClbitId(steps))?;

    Ok(circuit)
}

/// Run the tester on every bomb as one single-shot batch.
///
/// Registers come back in the order of `bombs`.
#[instrument(skip(backend, bombs), fields(backend = backend.name(), bombs = bombs.len()))]
pub async fn test_bombs<B>(
    backend: &B,
    bombs: &[Bomb],
    params: &TesterParams,
) -> BombResult<Vec<MeasurementRegister>>
where
    B: Backend + ?Sized,
{
    if bombs.is_empty() {
        return Ok(vec![]);
    }

    let circuits = bombs
        .iter()
        .map(|bomb| tester_circuit(bomb, params))
        .collect::<BombResult<Vec<_>>>()?;

    let results = backend.run_batch(&circuits, 1).await?;
    if results.len() != bombs.len() {
        return Err(BombError::ResultCountMismatch {
            expected: bombs.len(),
            got: results.len(),
        });
    }

    let registers = bombs
        .iter()
        .zip(&results)
        .map(|(bomb, result)| MeasurementRegister::decode(result, params.register_len(), bomb.id))
        .collect::<BombResult<Vec<_>>>()?;

    debug!(steps = params.steps(), "tester batch decoded");
    Ok(registers)
}
