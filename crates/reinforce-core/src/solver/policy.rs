use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::solver::{
    contract::{Fmdp, State, stable_key},
    error::SolverError,
    ids::StateKey,
    table::ValueTable,
};

/// Conditional distribution over actions given a state, plus a discount factor.
pub trait Policy<F: Fmdp> {
    /// Actions with nonzero probability from `state`. Probabilities sum to 1.
    fn distribution(&self, fmdp: &F, state: &F::S) -> Result<Vec<(F::A, f64)>, SolverError>;

    fn discount(&self) -> f64;
}

impl<F: Fmdp, P: Policy<F> + ?Sized> Policy<F> for &P {
    fn distribution(&self, fmdp: &F, state: &F::S) -> Result<Vec<(F::A, f64)>, SolverError> {
        (**self).distribution(fmdp, state)
    }

    fn discount(&self) -> f64 {
        (**self).discount()
    }
}

/// Exhaustive state-key to action-distribution table.
///
/// The solvers emit one-hot tables; arbitrary stochastic tables are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupPolicy<A> {
    discount: f64,
    table: BTreeMap<StateKey, Vec<(A, f64)>>,
}

impl<A: Clone> LookupPolicy<A> {
    pub fn new(discount: f64) -> Self {
        LookupPolicy {
            discount,
            table: BTreeMap::new(),
        }
    }

    /// Set the action distribution of `key`.
    pub fn insert(&mut self, key: StateKey, actions: Vec<(A, f64)>) -> Option<Vec<(A, f64)>> {
        self.table.insert(key, actions)
    }

    /// Make `key` choose `action` with probability 1.
    pub fn set_action(&mut self, key: StateKey, action: A) {
        self.table.insert(key, vec![(action, 1.0)]);
    }

    pub fn get(&self, key: &StateKey) -> Option<&[(A, f64)]> {
        self.table.get(key).map(Vec::as_slice)
    }

    /// Most probable action of `key`, the earliest listed one on ties.
    pub fn action(&self, key: &StateKey) -> Option<&A> {
        let actions = self.table.get(key)?;
        let mut best: Option<&(A, f64)> = None;
        for entry in actions {
            best = match best {
                Some(current) if entry.1 > current.1 => Some(entry),
                None => Some(entry),
                keep => keep,
            };
        }
        best.map(|(action, _)| action)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, StateKey, Vec<(A, f64)>> {
        self.table.iter()
    }
}

impl<F: Fmdp> Policy<F> for LookupPolicy<F::A> {
    fn distribution(&self, _fmdp: &F, state: &F::S) -> Result<Vec<(F::A, f64)>, SolverError> {
        let key = stable_key(state)?;
        self.table
            .get(&key)
            .cloned()
            .ok_or(SolverError::UnknownState { state: key })
    }

    fn discount(&self) -> f64 {
        self.discount
    }
}

/// Equiprobable choice among the legal actions of a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomPolicy {
    discount: f64,
}

impl RandomPolicy {
    pub fn new(discount: f64) -> Self {
        RandomPolicy { discount }
    }
}

impl<F: Fmdp> Policy<F> for RandomPolicy {
    fn distribution(&self, fmdp: &F, state: &F::S) -> Result<Vec<(F::A, f64)>, SolverError> {
        let actions = fmdp.actions(state);
        if actions.is_empty() {
            return Err(SolverError::MissingActions {
                state: stable_key(state)?,
            });
        }
        let prob = 1.0 / actions.len() as f64;
        Ok(actions.into_iter().map(|action| (action, prob)).collect())
    }

    fn discount(&self) -> f64 {
        self.discount
    }
}

/// One-step lookahead policy over a value table.
///
/// Works from the FMDP's responses directly, so it needs no state enumeration
/// and can drive episodes in spaces the dynamic programming solvers reject.
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyPolicy {
    values: ValueTable,
    discount: f64,
}

impl GreedyPolicy {
    pub fn new(values: ValueTable, discount: f64) -> Self {
        GreedyPolicy { values, discount }
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Greedy action of `state` and its action value, ties to the lowest index.
    pub fn select<F: Fmdp>(
        &self,
        fmdp: &F,
        state: &F::S,
    ) -> Result<Option<(F::A, f64)>, SolverError> {
        let mut best: Option<(F::A, f64)> = None;
        for action in fmdp.actions(state) {
            let mut q = 0.0;
            for response in fmdp.responses(state, &action) {
                let next_value = if response.next.is_terminal() {
                    0.0
                } else {
                    self.values.value(&stable_key(&response.next)?)
                };
                q += response.prob * (response.reward + self.discount * next_value);
            }
            best = match best {
                Some((_, best_q)) if q > best_q => Some((action, q)),
                None => Some((action, q)),
                keep => keep,
            };
        }
        Ok(best)
    }
}

impl<F: Fmdp> Policy<F> for GreedyPolicy {
    fn distribution(&self, fmdp: &F, state: &F::S) -> Result<Vec<(F::A, f64)>, SolverError> {
        match self.select(fmdp, state)? {
            Some((action, _)) => Ok(vec![(action, 1.0)]),
            None => Err(SolverError::MissingActions {
                state: stable_key(state)?,
            }),
        }
    }

    fn discount(&self) -> f64 {
        self.discount
    }
}
