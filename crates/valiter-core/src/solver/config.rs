use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

const DEFAULT_SOLVER_CONFIG_YAML: &str = include_str!("../../config/solver.default.yaml");

/// Parameters for a value-iteration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Discount factor in `[0, 1]`.
    pub gamma: f64,
    /// Convergence tolerance, strictly positive.
    pub epsilon: f64,
    /// Upper bound on sweeps before giving up with a best-effort estimate.
    pub max_sweeps: usize,
    /// Compute each sweep's per-state backups on the rayon pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            gamma: 0.9,
            epsilon: 1e-6,
            max_sweeps: 10_000,
            parallel: false,
        }
    }
}

impl SolverConfig {
    /// Config with the given discount and tolerance, defaults elsewhere.
    pub fn new(gamma: f64, epsilon: f64) -> Self {
        SolverConfig {
            gamma,
            epsilon,
            ..SolverConfig::default()
        }
    }

    /// Parse a solver config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SolverConfigError> {
        let config: SolverConfig = serde_yaml::from_str(yaml).map_err(SolverConfigError::Yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a solver config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SolverConfigError> {
        let yaml = fs::read_to_string(path).map_err(SolverConfigError::Io)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SOLVER_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SolverConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Reject parameters the solver cannot run with.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        if !self.gamma.is_finite() || !(0.0..=1.0).contains(&self.gamma) {
            return Err(SolverConfigError::Invalid(format!(
                "gamma must be finite and within [0, 1], got {}",
                self.gamma
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(SolverConfigError::Invalid(format!(
                "epsilon must be finite and > 0, got {}",
                self.epsilon
            )));
        }
        if self.max_sweeps == 0 {
            return Err(SolverConfigError::Invalid(
                "max_sweeps must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest sweep delta that counts as converged.
    ///
    /// Uses `epsilon * (1 - gamma) / gamma`, which keeps the result within `epsilon` of the
    /// fixed point. The bound is undefined at `gamma == 1`, where `epsilon` itself is the
    /// absolute threshold. At `gamma == 0` any finite delta stops after the first sweep.
    pub fn stopping_threshold(&self) -> f64 {
        if self.gamma >= 1.0 {
            self.epsilon
        } else if self.gamma <= 0.0 {
            f64::INFINITY
        } else {
            self.epsilon * (1.0 - self.gamma) / self.gamma
        }
    }
}

/// Error type for loading and validating `SolverConfig`.
#[derive(Debug)]
pub enum SolverConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Invalid(String),
}

impl fmt::Display for SolverConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverConfigError::Io(err) => write!(f, "failed to read config file: {err}"),
            SolverConfigError::Yaml(err) => write!(f, "failed to parse config YAML: {err}"),
            SolverConfigError::Invalid(err) => write!(f, "invalid solver config: {err}"),
        }
    }
}

impl std::error::Error for SolverConfigError {}
