use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use valiter_core::PROB_TOLERANCE;

use crate::{CompiledMdp, MdpError};

/// Tabular model as written in YAML.
///
/// Rewards belong to states, not outcomes: the utility of a state is its own reward plus
/// the discounted value of where its best action leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdpSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Id of the start state.
    pub start: String,
    pub states: Vec<StateSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSpec {
    pub id: String,
    #[serde(default)]
    pub reward: f64,
    /// Declared terminal. A state without actions is terminal either way.
    #[serde(default, skip_serializing_if = "is_false")]
    pub terminal: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    pub outcomes: Vec<OutcomeSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeSpec {
    pub next: String,
    pub prob: f64,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl MdpSpec {
    pub fn validate(&self) -> Result<(), MdpError> {
        self.validate_with_tolerance(PROB_TOLERANCE)
    }

    /// Check ids, rewards and outcome distributions.
    /// `tolerance` bounds how far each action's outcome mass may stray from 1.
    pub fn validate_with_tolerance(&self, tolerance: f64) -> Result<(), MdpError> {
        if self.start.trim().is_empty() {
            return Err(MdpError::MissingStart);
        }

        let mut known = HashSet::with_capacity(self.states.len());
        for state in &self.states {
            if !known.insert(state.id.as_str()) {
                return Err(MdpError::DuplicateStateId {
                    id: state.id.clone(),
                });
            }
        }
        if !known.contains(self.start.as_str()) {
            return Err(MdpError::UnknownStartState {
                start: self.start.clone(),
            });
        }

        self.states
            .iter()
            .try_for_each(|state| state.validate(&known, tolerance))
    }

    pub fn compile(&self) -> Result<CompiledMdp, MdpError> {
        CompiledMdp::from_spec(self)
    }
}

impl StateSpec {
    fn validate(&self, known: &HashSet<&str>, tolerance: f64) -> Result<(), MdpError> {
        if !self.reward.is_finite() {
            return Err(MdpError::InvalidReward {
                state: self.id.clone(),
                value: self.reward,
            });
        }
        if self.terminal && !self.actions.is_empty() {
            return Err(MdpError::TerminalStateHasActions {
                state: self.id.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(self.actions.len());
        for action in &self.actions {
            if !seen.insert(action.id.as_str()) {
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
        for (outcome_index, outcome) in self.outcomes.iter().enumerate() {
            if !(0.0..=1.0).contains(&outcome.prob) {
                return Err(MdpError::InvalidProbability {
                    state: state.to_string(),
                    action: self.id.clone(),
                    outcome_index,
                    value: outcome.prob,
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
