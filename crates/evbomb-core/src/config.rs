//! Experiment configuration.
//!
//! Values are layered, highest precedence first:
//! 1. Command-line flags (applied by the caller)
//! 2. Environment variables with the `EVBOMB_` prefix
//! 3. A YAML file (`--config`, else `~/.evbomb/config.yaml` when present)
//! 4. Defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use evbomb_hal::BackendConfig;

use crate::error::{BombError, BombResult};
use crate::tester::TesterParams;

/// Environment variable overriding [`ExperimentConfig::bombs`].
pub const ENV_BOMBS: &str = "EVBOMB_BOMBS";
/// Environment variable overriding [`ExperimentConfig::steps`].
pub const ENV_STEPS: &str = "EVBOMB_STEPS";
/// Environment variable overriding [`ExperimentConfig::epsilon`].
pub const ENV_EPSILON: &str = "EVBOMB_EPSILON";
/// Environment variable overriding [`ExperimentConfig::seed`].
pub const ENV_SEED: &str = "EVBOMB_SEED";
/// Environment variable overriding [`ExperimentConfig::readout_error`].
pub const ENV_READOUT_ERROR: &str = "EVBOMB_READOUT_ERROR";

/// Parameters of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Number of bombs to generate.
    pub bombs: u32,
    /// Tester steps per bomb.
    pub steps: u32,
    /// Rotation per step; π/steps when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    /// Simulator seed for reproducible runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Probability that the simulator misreads a bit.
    pub readout_error: f64,
    /// Shots per circuit. Every bomb is a single physical trial, so only 1
    /// is accepted.
    pub shots_per_circuit: u32,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            bombs: 10,
            steps: 10,
            epsilon: None,
            seed: None,
            readout_error: 0.0,
            shots_per_circuit: 1,
        }
    }
}

impl ExperimentConfig {
    /// `~/.evbomb/config.yaml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".evbomb").join("config.yaml"))
    }

    /// Parse YAML text.
    pub fn from_yaml_str(yaml: &str) -> BombResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> BombResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Serialise to YAML.
    pub fn to_yaml(&self) -> BombResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// File layer plus environment layer.
    ///
    /// An explicit `path` must exist; the default path is used only when
    /// present. The result is not validated, so callers can still apply
    /// command-line overrides before [`validate`](Self::validate).
    pub fn load(path: Option<&Path>) -> BombResult<Self> {
        let config = match path {
            Some(path) => {
                debug!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!(path = %path.display(), "loading default config");
                    Self::from_file(path)?
                }
                None => Self::default(),
            },
        };
        config.merge_env()
    }

    /// Apply `EVBOMB_*` environment overrides.
    pub fn merge_env(self) -> BombResult<Self> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`.
    pub fn merge_env_from<F>(mut self, lookup: F) -> BombResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BOMBS) {
            self.bombs = parse_env(ENV_BOMBS, &v)?;
        }
        if let Some(v) = lookup(ENV_STEPS) {
            self.steps = parse_env(ENV_STEPS, &v)?;
        }
        if let Some(v) = lookup(ENV_EPSILON) {
            self.epsilon = Some(parse_env(ENV_EPSILON, &v)?);
        }
        if let Some(v) = lookup(ENV_SEED) {
            self.seed = Some(parse_env(ENV_SEED, &v)?);
        }
        if let Some(v) = lookup(ENV_READOUT_ERROR) {
            self.readout_error = parse_env(ENV_READOUT_ERROR, &v)?;
        }
        Ok(self)
    }

    /// Check every field.
    pub fn validate(&self) -> BombResult<()> {
        self.tester_params()?;
        if !(0.0..=1.0).contains(&self.readout_error) {
            return Err(BombError::Config(format!(
                "readout_error must be within [0, 1], got {}",
                self.readout_error
            )));
        }
        if self.shots_per_circuit != 1 {
            return Err(BombError::Config(format!(
                "shots_per_circuit must be 1, got {}",
                self.shots_per_circuit
            )));
        }
        Ok(())
    }

    /// Validated tester parameters.
    pub fn tester_params(&self) -> BombResult<TesterParams> {
        TesterParams::new(self.steps, self.epsilon)
    }

    /// Settings for a simulator backend.
    pub fn backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new("simulator")
            .with_extra("readout_error", serde_json::json!(self.readout_error));
        if let Some(seed) = self.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> BombResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| BombError::Config(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&'static str, &'static str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|&(k, v)| (k, v.to_string())).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert_eq!(config.bombs, 10);
        assert_eq!(config.steps, 10);
        config.validate().unwrap();
        let params = config.tester_params().unwrap();
        assert!((params.epsilon() - std::f64::consts::PI / 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = ExperimentConfig::from_yaml_str("steps: 25\nseed: 7\n").unwrap();
        assert_eq!(config.steps, 25);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.bombs, 10);
        assert_eq!(config.epsilon, None);
    }

    #[test]
    fn test_unknown_yaml_field_rejected() {
        let err = ExperimentConfig::from_yaml_str("stepz: 3\n").unwrap_err();
        assert!(matches!(err, BombError::Yaml(_)));
    }

    #[test]
    fn test_yaml_file_round_trip() {
        let config = ExperimentConfig {
            bombs: 500,
            steps: 20,
            epsilon: Some(0.1),
            seed: Some(42),
            readout_error: 0.02,
            shots_per_circuit: 1,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = ExperimentConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExperimentConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, BombError::Io(_)));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let file = ExperimentConfig::from_yaml_str("bombs: 5\nsteps: 3\n").unwrap();
        let vars = env(&[(ENV_STEPS, "12"), (ENV_SEED, " 9 "), (ENV_READOUT_ERROR, "0.1")]);
        let merged = file.merge_env_from(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(merged.bombs, 5);
        assert_eq!(merged.steps, 12);
        assert_eq!(merged.seed, Some(9));
        assert_eq!(merged.readout_error, 0.1);
    }

    #[test]
    fn test_bad_env_value() {
        let vars = env(&[(ENV_BOMBS, "many")]);
        let err = ExperimentConfig::default()
            .merge_env_from(|k| vars.get(k).cloned())
            .unwrap_err();
        assert!(matches!(err, BombError::Config(msg) if msg.contains(ENV_BOMBS)));
    }

    #[test]
    fn test_validation_failures() {
        let zero_steps = ExperimentConfig {
            steps: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_steps.validate(),
            Err(BombError::InvalidSteps(0))
        ));

        let infinite = ExperimentConfig {
            epsilon: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(matches!(
            infinite.validate(),
            Err(BombError::InvalidEpsilon(_))
        ));

        let noisy = ExperimentConfig {
            readout_error: 1.5,
            ..Default::default()
        };
        assert!(matches!(noisy.validate(), Err(BombError::Config(_))));

        let many_shots = ExperimentConfig {
            shots_per_circuit: 100,
            ..Default::default()
        };
        assert!(matches!(many_shots.validate(), Err(BombError::Config(_))));
    }

    #[test]
    fn test_backend_config() {
        let config = ExperimentConfig {
            seed: Some(3),
            readout_error: 0.25,
            ..Default::default()
        };
        let backend = config.backend_config();
        assert_eq!(backend.get_u64("seed"), Some(3));
        assert_eq!(backend.get_f64("readout_error"), Some(0.25));
        assert_eq!(ExperimentConfig::default().backend_config().get_u64("seed"), None);
    }
}
