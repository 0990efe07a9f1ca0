use crate::{ActionSpec, CompiledMdp, MdpError, MdpSpec, OutcomeSpec, StateSpec};

#[derive(Debug, Clone, Default)]
/// Incremental construction of an `MdpSpec` without writing YAML.
pub struct MdpBuilder {
    start: Option<String>,
    agents: Option<usize>,
    states: Vec<StateSpec>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define the state episodes start from.
    pub fn set_start(&mut self, state: impl Into<String>) -> &mut Self {
        self.start = Some(state.into());
        self
    }

    /// Declare how many parties take turns choosing actions.
    pub fn set_agents(&mut self, agents: usize) -> &mut Self {
        self.agents = Some(agents);
        self
    }

    /// Add a new state, terminal or not.
    pub fn add_state(&mut self, id: impl Into<String>, terminal: bool) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            terminal: Some(terminal),
            agent: None,
            actions: None,
        });
        self
    }

    /// Hand the choice of actions in `state_id` to `agent`.
    pub fn set_agent(
        &mut self,
        state_id: impl AsRef<str>,
        agent: usize,
    ) -> Result<&mut Self, MdpError> {
        self.find_state(state_id.as_ref())?.agent = Some(agent);
        Ok(self)
    }

    /// Add an action to a state. Its outcomes are added with `add_outcome`.
    pub fn add_action(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl Into<String>,
    ) -> Result<&mut Self, MdpError> {
        let state = self.find_state(state_id.as_ref())?;
        state.actions.get_or_insert_with(Vec::new).push(ActionSpec {
            id: action_id.into(),
            outcomes: Vec::new(),
        });
        Ok(self)
    }

    /// Add one stochastic response to an action.
    pub fn add_outcome(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        prob: f64,
        reward: f64,
    ) -> Result<&mut Self, MdpError> {
        let state_id = state_id.as_ref();
        let action_id = action_id.as_ref();

        let state = self.find_state(state_id)?;
        let action = state
            .actions
            .get_or_insert_with(Vec::new)
            .iter_mut()
            .find(|a| a.id == action_id)
            .ok_or_else(|| MdpError::BuilderUnknownAction {
                state: state_id.to_string(),
                action: action_id.to_string(),
            })?;

        action.outcomes.push(OutcomeSpec {
            next: next.into(),
            prob,
            reward,
        });

        Ok(self)
    }

    pub fn build_spec(self) -> Result<MdpSpec, MdpError> {
        let start = self.start.ok_or(MdpError::MissingStart)?;
        let spec = MdpSpec {
            version: Some(1),
            start,
            agents: self.agents,
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledMdp, MdpError> {
        self.build_spec()?.compile()
    }

    fn find_state(&mut self, state_id: &str) -> Result<&mut StateSpec, MdpError> {
        self.states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| MdpError::BuilderUnknownState {
                state: state_id.to_string(),
            })
    }
}
