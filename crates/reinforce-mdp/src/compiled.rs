use std::{collections::HashMap, sync::Arc};

use reinforce_core::{Action, AgentId, Fmdp, Response, State, StateKey};

use crate::{MdpError, MdpSpec};

/// Floating point tolerance used when validating probability sums.
pub(crate) const PROB_TOLERANCE: f64 = 1e-9;

/// Id of the null action, reserved in every model.
pub const NULL_ACTION_ID: &str = "null";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Dense index for states in a compiled MDP.
pub struct StateIndex(usize);

impl StateIndex {
    /// Return the underlying state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateIndex {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A state of a compiled MDP. Its canonical key is the declared string id.
pub struct MdpState {
    index: StateIndex,
    id: Arc<str>,
    terminal: bool,
}

impl MdpState {
    pub fn index(&self) -> StateIndex {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl State for MdpState {
    fn key(&self) -> StateKey {
        StateKey::from(self.id.as_ref())
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An action of a compiled MDP, or the null action when `index` is `None`.
pub struct MdpAction {
    index: Option<usize>,
    id: Arc<str>,
    agent: AgentId,
}

impl MdpAction {
    fn null(agent: AgentId) -> Self {
        MdpAction {
            index: None,
            id: Arc::from(NULL_ACTION_ID),
            agent,
        }
    }

    /// Position among the state's declared actions.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Action for MdpAction {
    fn agent(&self) -> AgentId {
        self.agent
    }

    fn is_null(&self) -> bool {
        self.index.is_none()
    }
}

#[derive(Debug, Clone)]
/// Runtime form of an MDP with resolved state references and precomputed CDFs.
pub struct CompiledMdp {
    start: StateIndex,
    agents: usize,
    states: Vec<StateRec>,
    state_ids: Vec<Arc<str>>,
    state_id_to_index: HashMap<Arc<str>, StateIndex>,
}

#[derive(Debug, Clone)]
struct StateRec {
    terminal: bool,
    agent: AgentId,
    actions: Vec<ActionRec>,
}

#[derive(Debug, Clone)]
struct ActionRec {
    id: Arc<str>,
    outcomes: Vec<OutcomeRec>,
    cdf: Vec<f64>,
}

#[derive(Debug, Clone)]
struct OutcomeRec {
    next: StateIndex,
    reward: f64,
    prob: f64,
}

impl CompiledMdp {
    /// Compile and validate a spec into a fast runtime representation.
    pub(crate) fn from_spec(spec: &MdpSpec, tolerance: f64) -> Result<Self, MdpError> {
        spec.validate_with_tolerance(tolerance)?;

        let mut state_id_to_index = HashMap::with_capacity(spec.states.len());
        let mut state_ids = Vec::with_capacity(spec.states.len());

        for (idx, state) in spec.states.iter().enumerate() {
            let id: Arc<str> = Arc::from(state.id.as_str());
            state_id_to_index.insert(Arc::clone(&id), StateIndex::from(idx));
            state_ids.push(id);
        }

        let start = state_id_to_index
            .get(spec.start.as_str())
            .copied()
            .ok_or_else(|| MdpError::UnknownStartState {
                start: spec.start.clone(),
            })?;

        let mut states = Vec::with_capacity(spec.states.len());
        for state in &spec.states {
            let mut actions = Vec::new();

            for action in state.actions.as_deref().unwrap_or(&[]) {
                let mut outcomes = Vec::with_capacity(action.outcomes.len());
                let mut cdf = Vec::with_capacity(action.outcomes.len());
                let mut cumulative = 0.0_f64;

                for outcome in &action.outcomes {
                    cumulative += outcome.prob;
                    cdf.push(cumulative);
                    let next = state_id_to_index
                        .get(outcome.next.as_str())
                        .copied()
                        .ok_or_else(|| MdpError::UnknownNextState {
                            state: state.id.clone(),
                            action: action.id.clone(),
                            next: outcome.next.clone(),
                        })?;

                    outcomes.push(OutcomeRec {
                        next,
                        reward: outcome.reward,
                        prob: outcome.prob,
                    });
                }

                actions.push(ActionRec {
                    id: Arc::from(action.id.as_str()),
                    outcomes,
                    cdf,
                });
            }

            states.push(StateRec {
                terminal: state.is_terminal(),
                agent: AgentId::from(state.agent()),
                actions,
            });
        }

        log::debug!(
            "compiled MDP with {} states, start '{}'",
            states.len(),
            spec.start
        );

        Ok(Self {
            start,
            agents: spec.agent_count(),
            states,
            state_ids,
            state_id_to_index,
        })
    }

    /// Return the start state index.
    pub fn start(&self) -> StateIndex {
        self.start
    }

    /// Return the number of acting parties.
    pub fn agent_count(&self) -> usize {
        self.agents
    }

    /// Return the number of compiled states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Check whether a state is terminal.
    pub fn is_terminal(&self, index: StateIndex) -> Option<bool> {
        self.states.get(index.index()).map(|state| state.terminal)
    }

    /// Return the number of actions declared for a state.
    pub fn num_actions(&self, index: StateIndex) -> Option<usize> {
        self.states
            .get(index.index())
            .map(|state| state.actions.len())
    }

    /// Convert a state index back to its declared string id.
    pub fn state_id(&self, index: StateIndex) -> Option<&str> {
        self.state_ids.get(index.index()).map(|id| &**id)
    }

    /// Convert a string id into a compiled state index.
    pub fn state_index(&self, id: &str) -> Option<StateIndex> {
        self.state_id_to_index.get(id).copied()
    }

    /// The state at `index` as seen by the solvers.
    pub fn state(&self, index: StateIndex) -> Option<MdpState> {
        let rec = self.states.get(index.index())?;
        Some(MdpState {
            index,
            id: Arc::clone(self.state_ids.get(index.index())?),
            terminal: rec.terminal,
        })
    }

    /// Look a state up by its declared id.
    pub fn state_by_id(&self, id: &str) -> Option<MdpState> {
        self.state(self.state_index(id)?)
    }

    /// Look an action of `state` up by its declared id.
    pub fn action_by_id(&self, state: &MdpState, id: &str) -> Option<MdpAction> {
        let rec = self.states.get(state.index.index())?;
        if id == NULL_ACTION_ID {
            return Some(MdpAction::null(rec.agent));
        }
        let (idx, action) = rec
            .actions
            .iter()
            .enumerate()
            .find(|(_, action)| action.id.as_ref() == id)?;
        Some(MdpAction {
            index: Some(idx),
            id: Arc::clone(&action.id),
            agent: rec.agent,
        })
    }

    fn action_rec(&self, state: &MdpState, action: &MdpAction) -> Option<&ActionRec> {
        let rec = self.states.get(state.index.index())?;
        rec.actions.get(action.index?)
    }
}

impl Fmdp for CompiledMdp {
    type S = MdpState;
    type A = MdpAction;

    fn states(&self) -> Option<Vec<MdpState>> {
        (0..self.states.len())
            .map(|idx| self.state(StateIndex::from(idx)))
            .collect()
    }

    fn initial(&self) -> MdpState {
        MdpState {
            index: self.start,
            id: Arc::clone(&self.state_ids[self.start.index()]),
            terminal: self.states[self.start.index()].terminal,
        }
    }

    fn actions(&self, state: &MdpState) -> Vec<MdpAction> {
        let Some(rec) = self.states.get(state.index.index()) else {
            return Vec::new();
        };
        if rec.terminal {
            return vec![MdpAction::null(rec.agent)];
        }
        rec.actions
            .iter()
            .enumerate()
            .map(|(idx, action)| MdpAction {
                index: Some(idx),
                id: Arc::clone(&action.id),
                agent: rec.agent,
            })
            .collect()
    }

    fn responses(&self, state: &MdpState, action: &MdpAction) -> Vec<Response<MdpState>> {
        if state.terminal {
            return vec![Response::new(state.clone(), 0.0, 1.0)];
        }
        let Some(action) = self.action_rec(state, action) else {
            return Vec::new();
        };
        action
            .outcomes
            .iter()
            .filter_map(|outcome| {
                let next = self.state(outcome.next)?;
                Some(Response::new(next, outcome.reward, outcome.prob))
            })
            .collect()
    }

    /// Pick the response whose cumulative probability first reaches `sample`.
    fn sample(
        &self,
        state: &MdpState,
        action: &MdpAction,
        sample: f64,
    ) -> Option<Response<MdpState>> {
        if state.terminal {
            return Some(Response::new(state.clone(), 0.0, 1.0));
        }

        let action = self.action_rec(state, action)?;
        if action.outcomes.is_empty() {
            return None;
        }

        // Strictly above the sample, so zero-probability outcomes are never picked.
        let mut chosen_idx = action.cdf.partition_point(|p| *p <= sample);
        if chosen_idx >= action.outcomes.len() {
            chosen_idx = action.outcomes.len() - 1;
        }

        let outcome = &action.outcomes[chosen_idx];
        Some(Response::new(self.state(outcome.next)?, outcome.reward, outcome.prob))
    }
}
