//! Per-bomb measurement registers.

use serde::{Deserialize, Serialize};
use std::fmt;

use evbomb_hal::ExecutionResult;

use crate::bomb::BombId;
use crate::error::{BombError, BombResult};

/// The classical bits read back for one bomb.
///
/// Bits are stored in construction order: index `i` is classical bit `i`.
/// For a tester run with `S` steps, indices `0..S` are the per-step target
/// readings and index `S` is the final control reading. Serialised as a
/// construction-order string such as `"0001"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MeasurementRegister {
    bits: Vec<bool>,
}

impl MeasurementRegister {
    /// Wrap bits given in construction order.
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Parse a construction-order string of `0` and `1`.
    pub fn from_bit_str(s: &str) -> BombResult<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(BombError::InvalidRegister(s.to_string())),
            })
            .collect::<BombResult<Vec<_>>>()
            .map(Self::new)
    }

    /// Read `len` bits out of a single-shot result.
    ///
    /// The bit string is interpreted through the result's declared
    /// [`BitOrder`](evbomb_hal::BitOrder); no other reordering happens.
    pub fn decode(result: &ExecutionResult, len: usize, bomb: BombId) -> BombResult<Self> {
        let (bits, _) = result
            .counts
            .most_frequent()
            .ok_or_else(|| BombError::MissingMeasurement {
                bomb,
                detail: "result has no recorded shots".into(),
            })?;

        if bits.len() < len {
            return Err(BombError::MissingMeasurement {
                bomb,
                detail: format!("expected {len} bits, result '{bits}' has {}", bits.len()),
            });
        }

        let decoded = (0..len)
            .map(|i| result.bit_order.bit_at(bits, i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(decoded))
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the register holds no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// All bits in construction order.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// The per-step target readings (every bit but the last).
    pub fn intermediate(&self) -> &[bool] {
        match self.bits.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// The final control reading.
    pub fn final_bit(&self) -> Option<bool> {
        self.bits.last().copied()
    }
}

impl fmt::Display for MeasurementRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl From<MeasurementRegister> for String {
    fn from(register: MeasurementRegister) -> Self {
        register.to_string()
    }
}

impl TryFrom<String> for MeasurementRegister {
    type Error = BombError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_bit_str(&s)
    }
}
