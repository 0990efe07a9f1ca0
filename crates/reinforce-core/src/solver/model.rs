use std::collections::HashMap;

use crate::solver::{
    config::SolverConfig,
    contract::{Action, Fmdp, State, check_distribution, stable_key},
    error::{Distribution, SolverError},
    ids::{ActionId, StateKey},
    table::ValueTable,
};

/// Dense snapshot of an enumerable FMDP taken once at the start of a solve.
///
/// States are resolved to indices and every `(state, action)` response list is
/// validated up front, so sweeps only touch plain numbers.
#[derive(Debug, Clone)]
pub(crate) struct Model<S, A> {
    states: Vec<S>,
    keys: Vec<StateKey>,
    actions: Vec<Vec<A>>,
    pub(crate) kernel: Kernel,
}

/// Numeric transition structure, indexed `[state][action][response]`.
#[derive(Debug, Clone)]
pub(crate) struct Kernel {
    terminal: Vec<bool>,
    transitions: Vec<Vec<Vec<Transition>>>,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    /// `None` when the response leads outside the enumerated space.
    next: Option<usize>,
    reward: f64,
    prob: f64,
}

impl<S: State, A: Action> Model<S, A> {
    /// Enumerate, validate and index the FMDP.
    pub(crate) fn build<F>(fmdp: &F, config: &SolverConfig) -> Result<Self, SolverError>
    where
        F: Fmdp<S = S, A = A>,
    {
        let states = fmdp
            .states()
            .filter(|states| !states.is_empty())
            .ok_or(SolverError::NonEnumerableStateSpace)?;

        let mut keys = Vec::with_capacity(states.len());
        let mut index = HashMap::with_capacity(states.len());
        for (idx, state) in states.iter().enumerate() {
            let key = stable_key(state)?;
            if index.insert(key.clone(), idx).is_some() {
                return Err(SolverError::DuplicateState { key });
            }
            keys.push(key);
        }

        let mut actions = Vec::with_capacity(states.len());
        let mut terminal = Vec::with_capacity(states.len());
        let mut transitions = Vec::with_capacity(states.len());
        let mut escaped = 0_usize;

        for (state, key) in states.iter().zip(&keys) {
            let state_actions = fmdp.actions(state);
            let is_terminal = state.is_terminal();

            if is_terminal {
                // Pinned at 0, responses are never read.
                terminal.push(true);
                transitions.push(vec![Vec::new(); state_actions.len()]);
                actions.push(state_actions);
                continue;
            }

            if state_actions.is_empty() {
                return Err(SolverError::MissingActions { state: key.clone() });
            }

            let mut per_action = Vec::with_capacity(state_actions.len());
            for action in &state_actions {
                let responses = fmdp.responses(state, action);
                check_distribution(
                    key,
                    || Distribution::Responses {
                        action: format!("{action:?}"),
                    },
                    responses.iter().map(|response| response.prob),
                    config.prob_tolerance,
                )?;

                let mut resolved = Vec::with_capacity(responses.len());
                for response in responses {
                    let next_key = stable_key(&response.next)?;
                    let next = index.get(&next_key).copied();
                    if next.is_none() && !response.next.is_terminal() {
                        escaped += 1;
                        log::trace!("response of '{key}' leads to unlisted state '{next_key}'");
                    }
                    resolved.push(Transition {
                        next,
                        reward: response.reward,
                        prob: response.prob,
                    });
                }
                per_action.push(resolved);
            }

            terminal.push(false);
            transitions.push(per_action);
            actions.push(state_actions);
        }

        if escaped > 0 {
            log::warn!("{escaped} responses lead outside the enumerated state space, valued at 0");
        }
        log::debug!("compiled model with {} states", states.len());

        Ok(Model {
            states,
            keys,
            actions,
            kernel: Kernel {
                terminal,
                transitions,
            },
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn state(&self, idx: usize) -> &S {
        &self.states[idx]
    }

    pub(crate) fn key(&self, idx: usize) -> &StateKey {
        &self.keys[idx]
    }

    pub(crate) fn actions(&self, idx: usize) -> &[A] {
        &self.actions[idx]
    }

    /// Position of `action` in the enumeration order of state `idx`.
    pub(crate) fn action_id(&self, idx: usize, action: &A) -> Option<ActionId> {
        self.actions[idx]
            .iter()
            .position(|candidate| candidate == action)
            .map(ActionId::from)
    }

    /// Dense values read from a table, unseen states default to 0.
    pub(crate) fn values_from(&self, table: &ValueTable) -> Vec<f64> {
        self.keys
            .iter()
            .zip(&self.kernel.terminal)
            .map(|(key, terminal)| if *terminal { 0.0 } else { table.value(key) })
            .collect()
    }

    pub(crate) fn table_from(&self, values: &[f64]) -> ValueTable {
        let mut table = ValueTable::new();
        for (key, value) in self.keys.iter().zip(values) {
            table.set_value(key.clone(), *value);
        }
        table
    }
}

impl Kernel {
    pub(crate) fn len(&self) -> usize {
        self.terminal.len()
    }

    pub(crate) fn is_terminal(&self, idx: usize) -> bool {
        self.terminal[idx]
    }

    pub(crate) fn num_actions(&self, idx: usize) -> usize {
        self.transitions[idx].len()
    }

    /// One-step lookahead `Q(s, a) = sum p * (r + gamma * V(next))`.
    pub(crate) fn action_value(
        &self,
        idx: usize,
        action: ActionId,
        values: &[f64],
        gamma: f64,
    ) -> f64 {
        self.transitions[idx][action.index()]
            .iter()
            .map(|t| {
                let next_value = t.next.map_or(0.0, |next| values[next]);
                t.prob * (t.reward + gamma * next_value)
            })
            .sum()
    }

    /// Highest-valued action; ties go to the lowest index.
    pub(crate) fn greedy(&self, idx: usize, values: &[f64], gamma: f64) -> Option<(ActionId, f64)> {
        let mut best: Option<(ActionId, f64)> = None;
        for action in (0..self.num_actions(idx)).map(ActionId::from) {
            let q = self.action_value(idx, action, values, gamma);
            best = match best {
                Some((_, best_q)) if q > best_q => Some((action, q)),
                None => Some((action, q)),
                keep => keep,
            };
        }
        best
    }
}
