use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::solver::error::SolverError;

const DEFAULT_SOLVER_CONFIG_YAML: &str = include_str!("../../config/solver.default.yaml");

/// How a sweep reads the values it is replacing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepMode {
    /// Overwrite values as the sweep goes, later states see earlier updates.
    #[default]
    InPlace,
    /// Compute every update from a snapshot of the previous sweep.
    Synchronous,
    /// Synchronous sweep with per-state updates spread over the rayon pool.
    /// Runs sequentially when the `parallel` feature is off.
    Parallel,
}

/// Parameters shared by every solver. Passed explicitly to each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Discount factor, in `(0, 1]`.
    pub gamma: f64,
    /// A sweep whose largest value change is below this ends the loop.
    pub tolerance: f64,
    /// Hard cap on sweeps for value iteration and for each evaluation phase.
    pub max_sweeps: usize,
    /// Hard cap on evaluation/improvement rounds in policy iteration.
    pub max_improvements: usize,
    /// Episode budget for Monte Carlo prediction.
    pub max_episodes: usize,
    /// Steps after which an unfinished episode is abandoned.
    pub max_episode_steps: usize,
    /// Allowed deviation from 1.0 when validating probability sums.
    pub prob_tolerance: f64,
    /// Seed of the episode random streams.
    pub seed: u64,
    pub sweep: SweepMode,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            gamma: 1.0,
            tolerance: 1e-6,
            max_sweeps: 500,
            max_improvements: 100,
            max_episodes: 1000,
            max_episode_steps: 10_000,
            prob_tolerance: 1e-9,
            seed: 0,
            sweep: SweepMode::InPlace,
        }
    }
}

impl SolverConfig {
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

    /// Check the numeric ranges of every field.
    pub fn validate(&self) -> Result<(), SolverConfigError> {
        match self.invalid_reason() {
            Some(reason) => Err(SolverConfigError::Invalid(reason.to_string())),
            None => Ok(()),
        }
    }

    /// Validation as seen from inside a solver call.
    pub(crate) fn check(&self) -> Result<(), SolverError> {
        match self.invalid_reason() {
            Some(reason) => Err(SolverError::InvalidConfig(reason.to_string())),
            None => Ok(()),
        }
    }

    fn invalid_reason(&self) -> Option<&'static str> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 || self.gamma > 1.0 {
            return Some("gamma must be in (0, 1]");
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Some("tolerance must be finite and > 0");
        }
        if self.max_sweeps == 0 {
            return Some("max_sweeps must be greater than 0");
        }
        if self.max_improvements == 0 {
            return Some("max_improvements must be greater than 0");
        }
        if self.max_episodes == 0 {
            return Some("max_episodes must be greater than 0");
        }
        if self.max_episode_steps == 0 {
            return Some("max_episode_steps must be greater than 0");
        }
        if !self.prob_tolerance.is_finite() || self.prob_tolerance < 0.0 {
            return Some("prob_tolerance must be finite and >= 0");
        }
        None
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
