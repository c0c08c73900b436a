//! End-to-end bomb tester scenarios on the simulator and on scripted
//! backends with fixed registers.

use std::sync::Mutex;

use async_trait::async_trait;
use evbomb_adapter_sim::SimulatorBackend;
use evbomb_core::{
    Bomb, Experiment, ExperimentConfig, Outcome, TesterParams, expected_detonation_probability,
    test_bombs,
};
use evbomb_hal::{
    Backend, BackendAvailability, BitOrder, Capabilities, Counts, ExecutionResult, HalError,
    HalResult, JobId, JobStatus, ValidationResult,
};
use evbomb_ir::Circuit;

fn assert_rate_within_tolerance(observed: f64, expected: f64, tolerance: f64, what: &str) {
    assert!(
        (observed - expected).abs() <= tolerance,
        "{what}: observed {observed:.4}, expected {expected:.4} ± {tolerance}"
    );
}

fn config(bombs: u32, steps: u32) -> ExperimentConfig {
    ExperimentConfig {
        bombs,
        steps,
        ..Default::default()
    }
}

fn all_live(n: u32) -> Vec<Bomb> {
    (0..n).map(Bomb::live).collect()
}

/// Answers every circuit with the next scripted register.
///
/// Registers are given in construction order and reported in `order`.
struct ScriptedBackend {
    caps: Capabilities,
    order: BitOrder,
    script: Mutex<Vec<Vec<bool>>>,
    results: Mutex<Vec<(JobId, ExecutionResult)>>,
}

impl ScriptedBackend {
    fn new(order: BitOrder, registers: &[&str]) -> Self {
        let script = registers
            .iter()
            .rev()
            .map(|r| r.chars().map(|c| c == '1').collect())
            .collect();
        Self {
            caps: Capabilities::simulator(2),
            order,
            script: Mutex::new(script),
            results: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, _circuit: &Circuit) -> HalResult<ValidationResult> {
        Ok(ValidationResult::Valid)
    }

    async fn submit(&self, _circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        let bits = self
            .script
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| HalError::SubmissionFailed("script exhausted".into()))?;
        let mut results = self.results.lock().unwrap();
        let id = JobId::new(format!("scripted-{}", results.len()));
        let counts = Counts::from_pairs([(self.order.encode(&bits), u64::from(shots))]);
        results.push((
            id.clone(),
            ExecutionResult::new(counts, shots).with_bit_order(self.order),
        ));
        Ok(id)
    }

    async fn status(&self, _job_id: &JobId) -> HalResult<JobStatus> {
        Ok(JobStatus::Completed)
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        self.results
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == job_id)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn cancel(&self, _job_id: &JobId) -> HalResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn duds_are_always_recognised() {
    for steps in 1..=12 {
        let backend = SimulatorBackend::with_seed(u64::from(steps));
        let params = TesterParams::new(steps, None).unwrap();
        let bombs: Vec<Bomb> = (0..20).map(Bomb::dud).collect();

        let registers = test_bombs(&backend, &bombs, &params).await.unwrap();
        for register in registers {
            assert!(register.intermediate().iter().all(|&b| !b), "S={steps}");
            assert_eq!(register.final_bit(), Some(true), "S={steps}");
        }
    }
}

#[tokio::test]
async fn single_step_live_bomb_always_detonates() {
    let backend = SimulatorBackend::with_seed(5);
    let mut experiment = Experiment::new(config(0, 1), &backend).unwrap();
    let report = experiment.run_with_bombs(&all_live(50)).await.unwrap();

    assert_eq!(report.tally.detonated, 50);
    assert_eq!(report.detonation_rate(), Some(1.0));
}

#[tokio::test]
async fn scripted_single_step_registers() {
    for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
        let backend = ScriptedBackend::new(order, &["01", "10", "11", "00"]);
        let mut experiment = Experiment::new(config(0, 1), &backend).unwrap();
        let bombs = [Bomb::dud(0), Bomb::live(1), Bomb::live(2), Bomb::live(3)];
        let report = experiment.run_with_bombs(&bombs).await.unwrap();

        let outcomes: Vec<Outcome> = report.records.iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            [
                Outcome::Dud,
                Outcome::Detonated,
                Outcome::Detonated,
                Outcome::Live
            ],
            "{order:?}"
        );
        assert_eq!(report.records[0].register.to_string(), "01");
    }
}

#[tokio::test]
async fn scripted_late_detonation_beats_final_bit() {
    let backend = ScriptedBackend::new(BitOrder::MsbFirst, &["000101"]);
    let mut experiment = Experiment::new(config(0, 5), &backend).unwrap();
    let report = experiment.run_with_bombs(&all_live(1)).await.unwrap();
    assert_eq!(report.records[0].outcome, Outcome::Detonated);
}

#[tokio::test]
async fn short_backend_result_is_an_error() {
    // Two bits for a five-step run.
    let backend = ScriptedBackend::new(BitOrder::MsbFirst, &["01"]);
    let mut experiment = Experiment::new(config(0, 5), &backend).unwrap();
    let err = experiment.run_with_bombs(&all_live(1)).await.unwrap_err();
    assert!(err.to_string().contains("bomb #0"), "{err}");
}

#[tokio::test]
async fn detonation_rate_matches_theory() {
    let backend = SimulatorBackend::with_seed(31337);
    let steps = 10;
    let mut experiment = Experiment::new(config(0, steps), &backend).unwrap();
    let report = experiment.run_with_bombs(&all_live(2000)).await.unwrap();

    let expected = expected_detonation_probability(steps, std::f64::consts::PI / 10.0);
    assert_rate_within_tolerance(
        report.detonation_rate().unwrap(),
        expected,
        0.04,
        "detonation rate at S=10",
    );
    // Without noise, every live bomb either detonates or is found.
    let efficiency = report.detection_efficiency().unwrap();
    assert!((efficiency + report.detonation_rate().unwrap() - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn more_steps_fewer_detonations() {
    let backend = SimulatorBackend::with_seed(77);
    let bombs = all_live(1000);

    let mut rates = vec![];
    for steps in [2, 5, 25] {
        let mut experiment = Experiment::new(config(0, steps), &backend).unwrap();
        let report = experiment.run_with_bombs(&bombs).await.unwrap();
        rates.push(report.detonation_rate().unwrap());
    }
    assert!(rates[0] > rates[1] && rates[1] > rates[2], "{rates:?}");
}

#[tokio::test]
async fn sweep_shows_the_same_trend() {
    let backend = SimulatorBackend::with_seed(78);
    let mut experiment = Experiment::new(config(400, 1), &backend).unwrap();
    let reports = experiment.sweep(&[2, 25]).await.unwrap();

    let few = reports[0].detonation_rate().unwrap();
    let many = reports[1].detonation_rate().unwrap();
    let expected = expected_detonation_probability(2, std::f64::consts::PI / 2.0);
    assert_rate_within_tolerance(few, expected, 0.1, "S=2");
    assert!(few > many, "sweep: {few} vs {many}");
}

#[tokio::test]
async fn readout_error_misclassifies_some_duds() {
    let backend = SimulatorBackend::with_seed(4)
        .with_readout_error(0.2)
        .unwrap();
    let mut experiment = Experiment::new(config(0, 3), &backend).unwrap();
    let bombs: Vec<Bomb> = (0..500).map(Bomb::dud).collect();
    let report = experiment.run_with_bombs(&bombs).await.unwrap();

    // A dud is read correctly only if all four bits survive: 0.8^4.
    let correct = report.confusion().dud_bombs.dud as f64 / 500.0;
    assert_rate_within_tolerance(correct, 0.8_f64.powi(4), 0.08, "dud accuracy");
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let run = |seed| async move {
        let backend = SimulatorBackend::with_seed(seed);
        let mut experiment = Experiment::new(config(60, 6), &backend).unwrap();
        experiment.run().await.unwrap().records
    };
    assert_eq!(run(123).await, run(123).await);
}
