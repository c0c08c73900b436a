//! Simulator backend implementation.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use evbomb_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, BitOrder, Capabilities, Counts,
    ExecutionResult, HalError, HalResult, Job, JobId, JobStatus, ValidationResult,
};
use evbomb_ir::{Circuit, InstructionKind};

use crate::statevector::Statevector;

/// Default qubit limit of the simulator.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator.
///
/// Measurements are executed where they appear in the circuit: each one
/// samples its qubit, collapses the state and records the bit, so circuits
/// with mid-circuit measurements behave like they would on hardware. Circuits
/// without any measurement have every qubit measured at the end.
///
/// Jobs complete inside [`Backend::submit`]. Result bit strings are reported
/// [`BitOrder::MsbFirst`].
pub struct SimulatorBackend {
    config: BackendConfig,
    capabilities: Capabilities,
    jobs: Mutex<FxHashMap<String, SimJob>>,
    rng: Mutex<StdRng>,
    readout_error: f64,
}

impl SimulatorBackend {
    /// Create a simulator seeded from system entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a simulator whose outcomes are reproducible for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            config: BackendConfig::new("simulator"),
            capabilities: Capabilities::simulator(DEFAULT_MAX_QUBITS),
            jobs: Mutex::new(FxHashMap::default()),
            rng: Mutex::new(rng),
            readout_error: 0.0,
        }
    }

    /// Limit the number of qubits a circuit may use.
    #[must_use]
    pub fn with_max_qubits(mut self, max_qubits: u32) -> Self {
        self.capabilities.num_qubits = max_qubits;
        self
    }

    /// Flip every recorded bit independently with probability `p`.
    pub fn with_readout_error(mut self, p: f64) -> HalResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(HalError::Configuration(format!(
                "readout error must be within [0, 1], got {p}"
            )));
        }
        self.readout_error = p;
        Ok(self)
    }

    /// Configured readout error probability.
    pub fn readout_error(&self) -> f64 {
        self.readout_error
    }

    fn jobs(&self) -> MutexGuard<'_, FxHashMap<String, SimJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_limits(&self, circuit: &Circuit, shots: u32) -> HalResult<()> {
        if shots == 0 {
            return Err(HalError::InvalidShots("shots must be at least 1".into()));
        }
        if shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} exceeds the limit of {}",
                self.capabilities.max_shots
            )));
        }
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "Circuit has {} qubits but simulator only supports {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            )));
        }
        Ok(())
    }

    fn read_out<R: Rng + ?Sized>(&self, bit: bool, rng: &mut R) -> bool {
        if self.readout_error > 0.0 && rng.gen_bool(self.readout_error) {
            !bit
        } else {
            bit
        }
    }

    /// Execute one shot, returning classical bits in index order.
    fn run_shot<R: Rng + ?Sized>(&self, circuit: &Circuit, rng: &mut R) -> Vec<bool> {
        let mut sv = Statevector::new(circuit.num_qubits());
        let mut clbits = vec![false; circuit.num_clbits()];

        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(gate) => {
                    let qubits: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
                    sv.apply_gate(&gate.kind, &qubits);
                }
                InstructionKind::Measure => {
                    for (qubit, clbit) in inst.qubits.iter().zip(&inst.clbits) {
                        let bit = sv.measure(qubit.index(), rng);
                        clbits[clbit.index()] = self.read_out(bit, rng);
                    }
                }
                InstructionKind::Reset => {
                    for qubit in &inst.qubits {
                        sv.reset(qubit.index(), rng);
                    }
                }
                InstructionKind::Barrier => {}
            }
        }

        if circuit.has_measurements() {
            return clbits;
        }

        let basis = sv.sample(rng);
        (0..circuit.num_qubits())
            .map(|q| self.read_out(basis & (1 << q) != 0, rng))
            .collect()
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    fn run_simulation(&self, circuit: &Circuit, shots: u32) -> ExecutionResult {
        let start = Instant::now();
        let mut counts = Counts::new();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..shots {
            let bits = self.run_shot(circuit, &mut *rng);
            counts.insert(BitOrder::MsbFirst.encode(&bits), 1);
        }

        let elapsed = start.elapsed();
        debug!(?elapsed, distinct = counts.len(), "simulation completed");

        ExecutionResult::new(counts, shots)
            .with_bit_order(BitOrder::MsbFirst)
            .with_execution_time(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuit: &Circuit) -> HalResult<ValidationResult> {
        let mut reasons = vec![];
        if circuit.num_qubits() > self.capabilities.num_qubits as usize {
            reasons.push(format!(
                "circuit uses {} qubits, limit is {}",
                circuit.num_qubits(),
                self.capabilities.num_qubits
            ));
        }
        for inst in circuit.instructions() {
            if let Some(gate) = inst.as_gate() {
                if !self.capabilities.gate_set.contains(gate.name()) {
                    reasons.push(format!("unsupported gate '{}'", gate.name()));
                }
            }
        }

        Ok(if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        })
    }

    #[instrument(skip(self, circuit), fields(circuit = circuit.name()))]
    async fn submit(&self, circuit: &Circuit, shots: u32) -> HalResult<JobId> {
        self.check_limits(circuit, shots)?;

        let job_id = JobId::new(format!("sim-{}", Uuid::new_v4()));
        self.jobs().insert(
            job_id.0.clone(),
            SimJob {
                job: Job::new(job_id.clone(), circuit.name(), shots),
                result: None,
            },
        );

        let result = self.run_simulation(circuit, shots);

        if let Some(sim_job) = self.jobs().get_mut(&job_id.0) {
            sim_job.job.transition(JobStatus::Completed);
            sim_job.result = Some(result);
        }

        debug!(%job_id, "job completed");
        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        self.jobs()
            .get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self.jobs();
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (status, _) => Err(HalError::JobFailed(format!(
                "job {job_id} has no result (status: {status})"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self.jobs();
        let sim_job = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        sim_job.job.transition(JobStatus::Cancelled);
        Ok(())
    }
}

impl BackendFactory for SimulatorBackend {
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let rng = match config.get_u64("seed") {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let max_qubits = match config.get_u64("max_qubits") {
            Some(n) => u32::try_from(n)
                .map_err(|_| HalError::Configuration(format!("max_qubits {n} out of range")))?,
            None => DEFAULT_MAX_QUBITS,
        };

        let mut backend = Self::from_rng(rng).with_max_qubits(max_qubits);
        backend.config = config;
        let readout_error = backend.config.get_f64("readout_error").unwrap_or(0.0);
        backend.with_readout_error(readout_error)
    }
}
