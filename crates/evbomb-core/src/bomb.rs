//! Bombs and the bomb generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, instrument};

use evbomb_hal::Backend;
use evbomb_ir::{Circuit, ClbitId, QubitId};

use crate::error::{BombError, BombResult};
use crate::register::MeasurementRegister;

/// Position of a bomb within one experiment, `0..N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BombId(pub u32);

impl fmt::Display for BombId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bomb #{}", self.0)
    }
}

/// A bomb whose state is hidden from the tester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bomb {
    /// Identity within the experiment.
    pub id: BombId,
    /// `true` if the bomb explodes when its photon is absorbed.
    pub is_live: bool,
}

impl Bomb {
    /// A live bomb.
    pub fn live(id: u32) -> Self {
        Self {
            id: BombId(id),
            is_live: true,
        }
    }

    /// A dud.
    pub fn dud(id: u32) -> Self {
        Self {
            id: BombId(id),
            is_live: false,
        }
    }

    /// `"live"` or `"dud"`.
    pub fn label(&self) -> &'static str {
        if self.is_live { "live" } else { "dud" }
    }
}

/// One fair coin: Hadamard then measure.
pub fn generator_circuit(id: BombId) -> BombResult<Circuit> {
    let mut circuit = Circuit::with_size(format!("generator_{}", id.0), 1, 1);
    circuit.h(QubitId(0))?.measure(QubitId(0), ClbitId(0))?;
    Ok(circuit)
}

/// Draw `count` bombs, each live with probability 1/2.
///
/// Every bomb is its own single-shot circuit and all circuits go to the
/// backend as one batch. A count of zero returns immediately without
/// touching the backend. Backend failures are returned as they are.
#[instrument(skip(backend), fields(backend = backend.name()))]
pub async fn generate_bombs<B>(backend: &B, count: u32) -> BombResult<Vec<Bomb>>
where
    B: Backend + ?Sized,
{
    if count == 0 {
        return Ok(vec![]);
    }

    let circuits = (0..count)
        .map(|i| generator_circuit(BombId(i)))
        .collect::<BombResult<Vec<_>>>()?;

    let results = backend.run_batch(&circuits, 1).await?;
    if results.len() != circuits.len() {
        return Err(BombError::ResultCountMismatch {
            expected: circuits.len(),
            got: results.len(),
        });
    }

    let bombs = results
        .iter()
        .zip(0..count)
        .map(|(result, i)| {
            let register = MeasurementRegister::decode(result, 1, BombId(i))?;
            Ok(Bomb {
                id: BombId(i),
                is_live: register.bits()[0],
            })
        })
        .collect::<BombResult<Vec<_>>>()?;

    debug!(
        live = bombs.iter().filter(|b| b.is_live).count(),
        total = bombs.len(),
        "bombs generated"
    );
    Ok(bombs)
}
