//! Experiment records, tallies and derived statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bomb::{Bomb, BombId};
use crate::classifier::Outcome;
use crate::error::BombResult;
use crate::register::MeasurementRegister;
use crate::tester::TesterParams;

/// Exact noiseless probability that a live bomb explodes during a run.
///
/// Each step survives with probability `cos²(ε/2)`, so the run detonates
/// with `1 - cos^{2S}(ε/2)`, roughly `S·sin²(ε/2)` for small ε.
pub fn expected_detonation_probability(steps: u32, epsilon: f64) -> f64 {
    let survive = (epsilon / 2.0).cos().powi(2);
    1.0 - survive.powf(f64::from(steps))
}

/// Everything known about one bomb after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BombRecord {
    /// The bomb under test.
    pub bomb: Bomb,
    /// Bits read back, in construction order.
    pub register: MeasurementRegister,
    /// Classification of `register`.
    pub outcome: Outcome,
}

impl BombRecord {
    /// Identity of the bomb.
    pub fn id(&self) -> BombId {
        self.bomb.id
    }

    /// Whether the outcome agrees with the hidden state. Detonations never do.
    pub fn is_correct(&self) -> bool {
        matches!(
            (self.bomb.is_live, self.outcome),
            (true, Outcome::Live) | (false, Outcome::Dud)
        )
    }
}

/// Number of bombs per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTally {
    /// Bombs classified `Dud`.
    pub dud: u64,
    /// Bombs classified `Live`.
    pub live: u64,
    /// Bombs classified `Detonated`.
    pub detonated: u64,
}

impl OutcomeTally {
    /// Count one outcome.
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Dud => self.dud += 1,
            Outcome::Live => self.live += 1,
            Outcome::Detonated => self.detonated += 1,
        }
    }

    /// Count for one outcome.
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Dud => self.dud,
            Outcome::Live => self.live,
            Outcome::Detonated => self.detonated,
        }
    }

    /// Total bombs counted.
    pub fn total(&self) -> u64 {
        self.dud + self.live + self.detonated
    }

    /// `(outcome, count)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Outcome, u64)> + '_ {
        Outcome::ALL.into_iter().map(|o| (o, self.get(o)))
    }
}

impl FromIterator<Outcome> for OutcomeTally {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        let mut tally = Self::default();
        for outcome in iter {
            tally.add(outcome);
        }
        tally
    }
}

/// Outcomes split by the bombs' hidden state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    /// Outcomes of live bombs.
    pub live_bombs: OutcomeTally,
    /// Outcomes of duds.
    pub dud_bombs: OutcomeTally,
}

/// Result of one experiment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    /// Backend that executed the circuits.
    pub backend: String,
    /// Step count S.
    pub steps: u32,
    /// Rotation per step.
    pub epsilon: f64,
    /// Simulator seed, when one was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// One record per bomb, ordered by id.
    pub records: Vec<BombRecord>,
    /// Outcome counts over `records`.
    pub tally: OutcomeTally,
}

impl ExperimentReport {
    /// Assemble a report, tallying the records.
    pub fn new(
        backend: impl Into<String>,
        params: &TesterParams,
        seed: Option<u64>,
        mut records: Vec<BombRecord>,
    ) -> Self {
        records.sort_by_key(BombRecord::id);
        let tally = records.iter().map(|r| r.outcome).collect();
        Self {
            backend: backend.into(),
            steps: params.steps(),
            epsilon: params.epsilon(),
            seed,
            finished_at: Utc::now(),
            records,
            tally,
        }
    }

    /// Number of live bombs.
    pub fn live_bombs(&self) -> u64 {
        self.records.iter().filter(|r| r.bomb.is_live).count() as u64
    }

    /// Number of duds.
    pub fn dud_bombs(&self) -> u64 {
        self.records.len() as u64 - self.live_bombs()
    }

    /// Outcomes split by hidden state.
    pub fn confusion(&self) -> Confusion {
        let mut confusion = Confusion::default();
        for record in &self.records {
            let side = if record.bomb.is_live {
                &mut confusion.live_bombs
            } else {
                &mut confusion.dud_bombs
            };
            side.add(record.outcome);
        }
        confusion
    }

    /// Fraction of live bombs that exploded; `None` without live bombs.
    pub fn detonation_rate(&self) -> Option<f64> {
        let live = self.live_bombs();
        (live > 0).then(|| self.confusion().live_bombs.detonated as f64 / live as f64)
    }

    /// Fraction of live bombs identified as live without exploding.
    pub fn detection_efficiency(&self) -> Option<f64> {
        let live = self.live_bombs();
        (live > 0).then(|| self.confusion().live_bombs.live as f64 / live as f64)
    }

    /// Noiseless detonation probability for this run's parameters.
    pub fn expected_detonation_rate(&self) -> f64 {
        expected_detonation_probability(self.steps, self.epsilon)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> BombResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form to `path`.
    pub fn write_json(&self, path: impl AsRef<Path>) -> BombResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    fn record(bomb: Bomb, bits: &str) -> BombRecord {
        let register = MeasurementRegister::from_bit_str(bits).unwrap();
        let outcome = classify(&register);
        BombRecord {
            bomb,
            register,
            outcome,
        }
    }

    fn sample_report() -> ExperimentReport {
        let params = TesterParams::new(1, None).unwrap();
        ExperimentReport::new(
            "simulator",
            &params,
            Some(1),
            vec![
                record(Bomb::dud(3), "01"),
                record(Bomb::live(0), "10"),
                record(Bomb::live(1), "00"),
                record(Bomb::live(2), "00"),
            ],
        )
    }

    #[test]
    fn test_expected_probability() {
        // S = 1, ε = π: a live bomb always explodes.
        assert!((expected_detonation_probability(1, std::f64::consts::PI) - 1.0).abs() < 1e-12);
        assert_eq!(expected_detonation_probability(10, 0.0), 0.0);

        let s = 50;
        let eps = std::f64::consts::PI / f64::from(s);
        let exact = expected_detonation_probability(s, eps);
        let approx = f64::from(s) * (eps / 2.0).sin().powi(2);
        assert!((exact - approx).abs() < 0.01);
    }

    #[test]
    fn test_records_sorted_and_tallied() {
        let report = sample_report();
        let ids: Vec<u32> = report.records.iter().map(|r| r.id().0).collect();
        assert_eq!(ids, [0, 1, 2, 3]);
        assert_eq!(
            report.tally,
            OutcomeTally {
                dud: 1,
                live: 2,
                detonated: 1
            }
        );
        assert_eq!(report.tally.total(), 4);
    }

    #[test]
    fn test_rates() {
        let report = sample_report();
        assert_eq!(report.live_bombs(), 3);
        assert_eq!(report.dud_bombs(), 1);
        assert!((report.detonation_rate().unwrap() - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.detection_efficiency().unwrap() - 2.0 / 3.0).abs() < 1e-12);

        let confusion = report.confusion();
        assert_eq!(confusion.dud_bombs.dud, 1);
        assert_eq!(confusion.live_bombs.detonated, 1);
    }

    #[test]
    fn test_rates_without_live_bombs() {
        let params = TesterParams::new(1, None).unwrap();
        let report =
            ExperimentReport::new("simulator", &params, None, vec![record(Bomb::dud(0), "01")]);
        assert_eq!(report.detonation_rate(), None);
        assert_eq!(report.detection_efficiency(), None);
    }

    #[test]
    fn test_correctness() {
        assert!(record(Bomb::dud(0), "01").is_correct());
        assert!(record(Bomb::live(0), "00").is_correct());
        assert!(!record(Bomb::live(0), "10").is_correct());
    }

    #[test]
    fn test_json_export() {
        let report = sample_report();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["steps"], 1);
        assert_eq!(value["tally"]["detonated"], 1);
        assert_eq!(value["records"][0]["register"], "10");
        assert_eq!(value["records"][0]["outcome"], "detonated");
        assert_eq!(value["records"][0]["bomb"]["id"], 0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();
        let back: ExperimentReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back.records, report.records);
    }
}
