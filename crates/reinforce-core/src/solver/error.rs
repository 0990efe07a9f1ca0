use std::fmt;

use crate::solver::ids::StateKey;

/// Which probability list failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Distribution {
    /// Transition responses of one `(state, action)` pair.
    Responses { action: String },
    /// Action probabilities a policy assigned to a state.
    Policy,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Responses { action } => write!(f, "responses of action {action}"),
            Distribution::Policy => f.write_str("policy action probabilities"),
        }
    }
}

/// Error type for the solvers and the episode driver.
///
/// Running out of sweeps is not an error; it is reported through
/// `SolveReport::converged`.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The FMDP could not list its full state space.
    NonEnumerableStateSpace,
    /// Two enumerated states share one canonical key.
    DuplicateState { key: StateKey },
    /// Repeated key derivation for the same state disagreed.
    UnstableStateKey { first: StateKey, second: StateKey },
    /// Probabilities do not sum to 1 within tolerance.
    MalformedDistribution {
        state: StateKey,
        distribution: Distribution,
        sum: f64,
    },
    /// A single probability is negative, above 1, or not finite.
    InvalidProbability {
        state: StateKey,
        distribution: Distribution,
        value: f64,
    },
    /// A non-terminal state offered no action, not even the null action.
    MissingActions { state: StateKey },
    /// A policy has no entry for a state it was asked about.
    UnknownState { state: StateKey },
    /// A policy chose an action the FMDP does not list for the state.
    UnknownAction { state: StateKey, action: String },
    /// An episode did not reach a terminal state within the step cap.
    EpisodeLimit { steps: usize },
    /// The solver configuration failed validation.
    InvalidConfig(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::NonEnumerableStateSpace => {
                f.write_str("state space is not enumerable")
            }
            SolverError::DuplicateState { key } => {
                write!(f, "state '{key}' is enumerated more than once")
            }
            SolverError::UnstableStateKey { first, second } => write!(
                f,
                "state key is unstable: derived '{first}' then '{second}' for the same state"
            ),
            SolverError::MalformedDistribution {
                state,
                distribution,
                sum,
            } => write!(
                f,
                "{distribution} in state '{state}' must sum to 1.0, got {sum}"
            ),
            SolverError::InvalidProbability {
                state,
                distribution,
                value,
            } => write!(
                f,
                "invalid probability {value} in {distribution} of state '{state}'"
            ),
            SolverError::MissingActions { state } => {
                write!(f, "non-terminal state '{state}' has no actions")
            }
            SolverError::UnknownState { state } => {
                write!(f, "policy has no entry for state '{state}'")
            }
            SolverError::UnknownAction { state, action } => write!(
                f,
                "policy selected action {action} which state '{state}' does not offer"
            ),
            SolverError::EpisodeLimit { steps } => {
                write!(f, "episode did not terminate within {steps} steps")
            }
            SolverError::InvalidConfig(reason) => write!(f, "invalid solver config: {reason}"),
        }
    }
}

impl std::error::Error for SolverError {}
