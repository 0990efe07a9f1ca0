use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompiledMdp, MdpError, compiled::{NULL_ACTION_ID, PROB_TOLERANCE}};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Serializable finite MDP: states, their actions and the stochastic responses
/// of every action. Read from and written to YAML.
pub struct MdpSpec {
    /// Schema version for future compatibility checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Id of the state every episode starts from.
    pub start: String,
    /// Number of acting parties. One when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<usize>,
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSpec {
    /// Unique state id, also the state's canonical key.
    pub id: String,
    /// Defaults to `false` if omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
    /// The party choosing the actions of this state. Agent 0 when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionSpec>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One environment response: next state, its probability and the reward.
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
    pub reward: f64,
}

impl MdpSpec {
    /// Number of acting parties declared by the model.
    pub fn agent_count(&self) -> usize {
        self.agents.unwrap_or(1)
    }

    /// Validate schema invariants using the crate default tolerance.
    pub fn validate(&self) -> Result<(), MdpError> {
        self.validate_with_tolerance(PROB_TOLERANCE)
    }

    /// Validate ids, agents, transitions, and probability constraints.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), MdpError> {
        if self.start.trim().is_empty() {
            return Err(MdpError::MissingStart);
        }

        let mut ids = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !ids.insert(state.id.as_str()) {
                return Err(MdpError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }

        if !ids.contains(self.start.as_str()) {
            return Err(MdpError::UnknownStartState {
                start: self.start.clone(),
            });
        }

        let agents = self.agent_count();
        for state in &self.states {
            state.validate(&ids, agents, tolerance)?;
        }

        Ok(())
    }

    /// Compile this spec into the runtime representation.
    pub fn compile(&self) -> Result<CompiledMdp, MdpError> {
        self.compile_with_tolerance(PROB_TOLERANCE)
    }

    /// Compile, validating probability sums within `tolerance`.
    pub fn compile_with_tolerance(&self, tolerance: f64) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self, tolerance)
    }
}

impl StateSpec {
    pub fn is_terminal(&self) -> bool {
        self.terminal.unwrap_or(false)
    }

    pub fn agent(&self) -> usize {
        self.agent.unwrap_or(0)
    }

    fn validate(
        &self,
        known: &HashSet<&str>,
        agents: usize,
        tolerance: f64,
    ) -> Result<(), MdpError> {
        let actions = self.actions.as_deref().unwrap_or(&[]);

        if self.agent() >= agents {
            return Err(MdpError::InvalidAgent {
                state: self.id.clone(),
                agent: self.agent(),
                agents,
            });
        }

        if self.is_terminal() {
            if !actions.is_empty() {
                return Err(MdpError::TerminalStateHasActions {
                    state: self.id.clone(),
                });
            }
            return Ok(());
        }

        // A non-terminal state must always offer a way forward.
        if actions.is_empty() {
            return Err(MdpError::DeadEndState {
                state: self.id.clone(),
            });
        }

        let mut action_ids = HashSet::with_capacity(actions.len());
        for action in actions {
            if action.id == NULL_ACTION_ID {
                return Err(MdpError::ReservedActionId {
                    state: self.id.clone(),
                    action: action.id.clone(),
                });
            }
            if !action_ids.insert(action.id.as_str()) {
                return Err(MdpError::DuplicateActionId {
                    state: self.id.clone(),
                    action: action.id.clone(),
                });
            }
            action.validate(&self.id, known, tolerance)?;
        }

        Ok(())
    }
}

impl ActionSpec {
    fn validate(&self, state: &str, known: &HashSet<&str>, tolerance: f64) -> Result<(), MdpError> {
        if self.outcomes.is_empty() {
            return Err(MdpError::EmptyOutcomes {
                state: state.to_string(),
                action: self.id.clone(),
            });
        }

        let mut sum = 0.0_f64;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if !outcome.prob.is_finite() || !(0.0..=1.0).contains(&outcome.prob) {
                return Err(MdpError::InvalidProbability {
                    state: state.to_string(),
                    action: self.id.clone(),
                    outcome_index: i,
                    value: outcome.prob,
                });
            }

            if !outcome.reward.is_finite() {
                return Err(MdpError::InvalidReward {
                    state: state.to_string(),
                    action: self.id.clone(),
                    outcome_index: i,
                    value: outcome.reward,
                });
            }

            if !known.contains(outcome.next.as_str()) {
                return Err(MdpError::UnknownNextState {
                    state: state.to_string(),
                    action: self.id.clone(),
                    next: outcome.next.clone(),
                });
            }

            sum += outcome.prob;
        }

        if (sum - 1.0).abs() > tolerance {
            return Err(MdpError::ProbabilitySum {
                state: state.to_string(),
                action: self.id.clone(),
                sum,
                tolerance,
            });
        }

        Ok(())
    }
}
