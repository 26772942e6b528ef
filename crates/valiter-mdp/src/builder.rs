use crate::{ActionSpec, CompiledMdp, MdpError, MdpSpec, OutcomeSpec, StateSpec};

/// Assembles an [`MdpSpec`] in code instead of YAML.
///
/// States must be declared before their actions, and actions before their outcomes.
#[derive(Debug, Clone, Default)]
pub struct MdpBuilder {
    start: Option<String>,
    states: Vec<StateSpec>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_start(&mut self, state: impl Into<String>) -> &mut Self {
        self.start = Some(state.into());
        self
    }

    /// Declare a state earning `reward` whenever it is occupied.
    pub fn add_state(&mut self, id: impl Into<String>, reward: f64) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            reward,
            terminal: false,
            actions: Vec::new(),
        });
        self
    }

    /// Declare an absorbing state. Its utility is exactly `reward`.
    pub fn add_terminal(&mut self, id: impl Into<String>, reward: f64) -> &mut Self {
        self.states.push(StateSpec {
            id: id.into(),
            reward,
            terminal: true,
            actions: Vec::new(),
        });
        self
    }

    pub fn add_action(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl Into<String>,
    ) -> Result<&mut Self, MdpError> {
        self.state_mut(state_id.as_ref())?.actions.push(ActionSpec {
            id: action_id.into(),
            outcomes: Vec::new(),
        });
        Ok(self)
    }

    /// Append one branch to the outcome distribution of `action_id`.
    pub fn add_outcome(
        &mut self,
        state_id: impl AsRef<str>,
        action_id: impl AsRef<str>,
        next: impl Into<String>,
        prob: f64,
    ) -> Result<&mut Self, MdpError> {
        let (state_id, action_id) = (state_id.as_ref(), action_id.as_ref());
        let state = self.state_mut(state_id)?;
        let Some(action) = state.actions.iter_mut().find(|a| a.id == action_id) else {
            return Err(MdpError::BuilderUnknownAction {
                state: state_id.to_string(),
                action: action_id.to_string(),
            });
        };

        action.outcomes.push(OutcomeSpec {
            next: next.into(),
            prob,
        });
        Ok(self)
    }

    /// Finish the model and validate it.
    pub fn build_spec(self) -> Result<MdpSpec, MdpError> {
        let spec = MdpSpec {
            version: Some(1),
            start: self.start.ok_or(MdpError::MissingStart)?,
            states: self.states,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn compile(self) -> Result<CompiledMdp, MdpError> {
        self.build_spec()?.compile()
    }

    fn state_mut(&mut self, state_id: &str) -> Result<&mut StateSpec, MdpError> {
        self.states
            .iter_mut()
            .find(|s| s.id == state_id)
            .ok_or_else(|| MdpError::BuilderUnknownState {
                state: state_id.to_string(),
            })
    }
}
