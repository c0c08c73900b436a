//! Execution results and the bit-order contract.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// How a result bit string maps onto classical-bit indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Leftmost character is the highest-index classical bit.
    #[default]
    MsbFirst,
    /// Leftmost character is classical bit 0.
    LsbFirst,
}

impl BitOrder {
    /// Read classical bit `index` out of `bits`.
    pub fn bit_at(self, bits: &str, index: usize) -> HalResult<bool> {
        let raw = bits.as_bytes();
        if index >= raw.len() {
            return Err(HalError::MalformedBitString(format!(
                "{bits} has no bit {index}"
            )));
        }
        let pos = match self {
            BitOrder::MsbFirst => raw.len() - 1 - index,
            BitOrder::LsbFirst => index,
        };
        match raw[pos] {
            b'0' => Ok(false),
            b'1' => Ok(true),
            _ => Err(HalError::MalformedBitString(bits.to_string())),
        }
    }

    /// Render bits given in classical-bit index order.
    pub fn encode(self, bits: &[bool]) -> String {
        let digit = |&b: &bool| if b { '1' } else { '0' };
        match self {
            BitOrder::MsbFirst => bits.iter().rev().map(digit).collect(),
            BitOrder::LsbFirst => bits.iter().map(digit).collect(),
        }
    }
}

/// Measurement counts from a quantum execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create counts from `(bitstring, count)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut counts = Self::new();
        for (bits, n) in pairs {
            counts.insert(bits, n);
        }
        counts
    }

    /// Add `count` occurrences of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Occurrences of a bit string.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct bit strings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent bit string, ties broken lexicographically.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.sorted().into_iter().next()
    }

    /// Entries sorted by descending count, then by bit string.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.counts.iter().map(|(k, &v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Iterate over `(bitstring, count)` in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Result of executing one circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time, if measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
    /// Order of the bits inside each key of `counts`.
    pub bit_order: BitOrder,
}

impl ExecutionResult {
    /// Create a result with `MsbFirst` bit strings.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
            bit_order: BitOrder::MsbFirst,
        }
    }

    /// Record the execution time.
    #[must_use]
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Declare the bit order of the counts.
    #[must_use]
    pub fn with_bit_order(mut self, order: BitOrder) -> Self {
        self.bit_order = order;
        self
    }
}
