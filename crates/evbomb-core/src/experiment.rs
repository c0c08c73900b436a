//! Experiment runner: generate, test, classify, report.

use tracing::{info, instrument};

use evbomb_hal::Backend;

use crate::bomb::{Bomb, generate_bombs};
use crate::classifier::classify;
use crate::config::ExperimentConfig;
use crate::error::BombResult;
use crate::report::{BombRecord, ExperimentReport};
use crate::tester::{TesterParams, test_bombs};

/// Callback invoked once per classified bomb.
pub type Observer<'a> = Box<dyn FnMut(&BombRecord) + 'a>;

/// One configured experiment against a backend.
///
/// ```ignore
/// let backend = SimulatorBackend::with_seed(7);
/// let mut experiment = Experiment::new(ExperimentConfig::default(), &backend)?;
/// let report = experiment.run().await?;
/// println!("{:?}", report.tally);
/// ```
pub struct Experiment<'a, B: Backend + ?Sized> {
    config: ExperimentConfig,
    backend: &'a B,
    observer: Option<Observer<'a>>,
}

impl<'a, B: Backend + ?Sized> Experiment<'a, B> {
    /// Validate `config` and bind it to `backend`.
    pub fn new(config: ExperimentConfig, backend: &'a B) -> BombResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            observer: None,
        })
    }

    /// Report each bomb as soon as it is classified.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&BombRecord) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// The validated configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Generate `config.bombs` bombs and test them.
    #[instrument(skip(self), fields(bombs = self.config.bombs, steps = self.config.steps))]
    pub async fn run(&mut self) -> BombResult<ExperimentReport> {
        let bombs = generate_bombs(self.backend, self.config.bombs).await?;
        info!(
            live = bombs.iter().filter(|b| b.is_live).count(),
            total = bombs.len(),
            "bombs generated"
        );
        self.run_with_bombs(&bombs).await
    }

    /// Test caller-supplied bombs with the configured parameters.
    pub async fn run_with_bombs(&mut self, bombs: &[Bomb]) -> BombResult<ExperimentReport> {
        let params = self.config.tester_params()?;
        self.run_with_params(bombs, &params).await
    }

    /// Generate one bomb set and test it at every step count in `steps`,
    /// each with ε = π/S.
    #[instrument(skip(self, steps), fields(points = steps.len()))]
    pub async fn sweep(&mut self, steps: &[u32]) -> BombResult<Vec<ExperimentReport>> {
        // Reject bad step counts before spending backend time.
        let params = steps
            .iter()
            .map(|&s| TesterParams::new(s, None))
            .collect::<BombResult<Vec<_>>>()?;

        let bombs = generate_bombs(self.backend, self.config.bombs).await?;
        let mut reports = Vec::with_capacity(params.len());
        for p in &params {
            reports.push(self.run_with_params(&bombs, p).await?);
        }
        Ok(reports)
    }

    async fn run_with_params(
        &mut self,
        bombs: &[Bomb],
        params: &TesterParams,
    ) -> BombResult<ExperimentReport> {
        info!(
            bombs = bombs.len(),
            steps = params.steps(),
            epsilon = params.epsilon(),
            "testing bombs"
        );

        let registers = test_bombs(self.backend, bombs, params).await?;

        let mut records = Vec::with_capacity(bombs.len());
        for (bomb, register) in bombs.iter().zip(registers) {
            let outcome = classify(&register);
            let record = BombRecord {
                bomb: *bomb,
                register,
                outcome,
            };
            if let Some(observer) = self.observer.as_mut() {
                observer(&record);
            }
            records.push(record);
        }

        let report = ExperimentReport::new(
            self.backend.name(),
            params,
            self.config.seed,
            records,
        );
        info!(
            dud = report.tally.dud,
            live = report.tally.live,
            detonated = report.tally.detonated,
            "experiment finished"
        );
        Ok(report)
    }
}
