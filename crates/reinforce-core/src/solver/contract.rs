use std::fmt::Debug;

use crate::solver::{
    error::{Distribution, SolverError},
    ids::{AgentId, StateKey},
};

/// A state of a finite MDP.
pub trait State: Clone + Debug {
    /// Canonical key derived from the state's content.
    /// Two states are the same state iff their keys are equal.
    fn key(&self) -> StateKey;

    /// The terminal state is absorbing: it transitions to itself with reward 0.
    fn is_terminal(&self) -> bool;
}

/// An action chosen by one of the acting parties.
pub trait Action: Clone + Debug + PartialEq {
    /// The party that chose the action.
    fn agent(&self) -> AgentId;

    /// The null action stands for "no legal move": wrong turn, or the episode is over.
    fn is_null(&self) -> bool;
}

/// One possible environment response to an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<S> {
    pub next: S,
    pub reward: f64,
    pub prob: f64,
}

impl<S> Response<S> {
    pub fn new(next: S, reward: f64, prob: f64) -> Self {
        Response { next, reward, prob }
    }
}

/// Interface for finite MDPs whose dynamics are fully known.
///
/// Every method must be free of side effects on the FMDP and stable for the
/// duration of a solve.
pub trait Fmdp {
    type S: State;
    type A: Action;

    /// All states including the terminal sink, or `None` when the state space
    /// cannot be enumerated.
    fn states(&self) -> Option<Vec<Self::S>>;

    /// The state every episode starts from.
    fn initial(&self) -> Self::S;

    /// Legal actions from `state` in a stable order. Terminal states, and states
    /// where it is not the querying party's turn, return the null action alone.
    fn actions(&self, state: &Self::S) -> Vec<Self::A>;

    /// The transition responses of `(state, action)`; probabilities sum to 1.
    fn responses(&self, state: &Self::S, action: &Self::A) -> Vec<Response<Self::S>>;

    /// Sample one response using a uniform sample in `[0, 1)`.
    /// Returns `None` when the action has no responses.
    fn sample(&self, state: &Self::S, action: &Self::A, sample: f64) -> Option<Response<Self::S>> {
        let responses = self.responses(state, action);
        let last = responses.len().checked_sub(1)?;
        let mut cumulative = 0.0_f64;
        for (idx, response) in responses.into_iter().enumerate() {
            cumulative += response.prob;
            if sample < cumulative || idx == last {
                return Some(response);
            }
        }
        None
    }
}

/// Derive a state's key twice and fail if the two disagree.
pub fn stable_key<S: State>(state: &S) -> Result<StateKey, SolverError> {
    let first = state.key();
    let second = state.key();
    if first != second {
        return Err(SolverError::UnstableStateKey { first, second });
    }
    Ok(first)
}

/// Validate that `probs` is a probability distribution within `tolerance`.
pub(crate) fn check_distribution(
    state: &StateKey,
    distribution: impl Fn() -> Distribution,
    probs: impl IntoIterator<Item = f64>,
    tolerance: f64,
) -> Result<(), SolverError> {
    let mut sum = 0.0_f64;
    for prob in probs {
        if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
            return Err(SolverError::InvalidProbability {
                state: state.clone(),
                distribution: distribution(),
                value: prob,
            });
        }
        sum += prob;
    }

    if (sum - 1.0).abs() > tolerance {
        return Err(SolverError::MalformedDistribution {
            state: state.clone(),
            distribution: distribution(),
            sum,
        });
    }
    Ok(())
}
