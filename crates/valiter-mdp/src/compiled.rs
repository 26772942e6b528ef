use std::collections::HashMap;

use valiter_core::{MarkovDecisionProcess, PROB_TOLERANCE};

use crate::{ActionSpec, MdpError, MdpSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Dense index for states in a compiled MDP, in declaration order.
pub struct StateKey(usize);

impl StateKey {
    /// Return the underlying state index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for StateKey {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

/// Model with state ids resolved to [`StateKey`]s, ready to solve or sample.
///
/// Implements `MarkovDecisionProcess` with `StateKey` states and action ids as actions,
/// so policy ties resolve to the lexicographically smallest action id.
#[derive(Debug, Clone)]
pub struct CompiledMdp {
    start: StateKey,
    states: Vec<StateRec>,
    ids: Vec<String>,
    keys: HashMap<String, StateKey>,
}

#[derive(Debug, Clone)]
struct StateRec {
    terminal: bool,
    reward: f64,
    actions: Vec<ActionRec>,
}

#[derive(Debug, Clone)]
struct ActionRec {
    id: String,
    outcomes: Vec<OutcomeRec>,
}

#[derive(Debug, Clone)]
struct OutcomeRec {
    next: StateKey,
    prob: f64,
    /// Probability mass of this outcome and every one listed before it.
    cumulative: f64,
}

impl ActionRec {
    fn resolve(
        state: &str,
        spec: &ActionSpec,
        keys: &HashMap<String, StateKey>,
    ) -> Result<Self, MdpError> {
        let mut cumulative = 0.0_f64;
        let outcomes = spec
            .outcomes
            .iter()
            .map(|outcome| {
                let next = keys.get(&outcome.next).copied().ok_or_else(|| {
                    MdpError::UnknownNextState {
                        state: state.to_string(),
                        action: spec.id.clone(),
                        next: outcome.next.clone(),
                    }
                })?;
                cumulative += outcome.prob;
                Ok(OutcomeRec {
                    next,
                    prob: outcome.prob,
                    cumulative,
                })
            })
            .collect::<Result<Vec<_>, MdpError>>()?;

        Ok(ActionRec {
            id: spec.id.clone(),
            outcomes,
        })
    }

    /// Outcome selected by a uniform `sample` in `[0, 1)`.
    /// Rounding slack below 1.0 falls to the last outcome.
    fn pick(&self, sample: f64) -> Option<&OutcomeRec> {
        let idx = self
            .outcomes
            .partition_point(|outcome| outcome.cumulative <= sample);
        self.outcomes.get(idx).or_else(|| self.outcomes.last())
    }
}

impl CompiledMdp {
    /// Validate `spec` and resolve every state reference.
    pub(crate) fn from_spec(spec: &MdpSpec) -> Result<Self, MdpError> {
        spec.validate_with_tolerance(PROB_TOLERANCE)?;

        let ids: Vec<String> = spec.states.iter().map(|state| state.id.clone()).collect();
        let keys: HashMap<String, StateKey> = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), StateKey::from(idx)))
            .collect();

        let start = keys
            .get(&spec.start)
            .copied()
            .ok_or_else(|| MdpError::UnknownStartState {
                start: spec.start.clone(),
            })?;

        let states = spec
            .states
            .iter()
            .map(|state| {
                let actions = state
                    .actions
                    .iter()
                    .map(|action| ActionRec::resolve(&state.id, action, &keys))
                    .collect::<Result<Vec<_>, MdpError>>()?;
                Ok(StateRec {
                    terminal: state.terminal,
                    reward: state.reward,
                    actions,
                })
            })
            .collect::<Result<Vec<_>, MdpError>>()?;

        Ok(CompiledMdp {
            start,
            states,
            ids,
            keys,
        })
    }

    /// Return the start state key.
    pub fn start(&self) -> StateKey {
        self.start
    }

    /// Return the number of compiled states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Check whether a state is terminal, either declared so or without actions.
    pub fn is_terminal(&self, key: StateKey) -> Option<bool> {
        self.states
            .get(key.index())
            .map(|state| state.terminal || state.actions.is_empty())
    }

    /// Return the position of `action_id` among the actions of a state.
    pub fn action_index(&self, key: StateKey, action_id: &str) -> Option<usize> {
        self.states
            .get(key.index())?
            .actions
            .iter()
            .position(|action| action.id == action_id)
    }

    /// Convert a state key back to its original string id.
    pub fn state_id(&self, key: StateKey) -> Option<&str> {
        self.ids.get(key.index()).map(String::as_str)
    }

    /// Convert a string id into a compiled state key.
    pub fn state_key(&self, id: &str) -> Option<StateKey> {
        self.keys.get(id).copied()
    }

    /// Sample a successor of `(state_key, action_id)` with a uniform `sample` in `[0, 1)`.
    /// Returns the successor, its reward and whether it is terminal.
    pub(crate) fn sample_transition(
        &self,
        state_key: StateKey,
        action_id: usize,
        sample: f64,
    ) -> Option<(StateKey, f64, bool)> {
        let state = self.states.get(state_key.index())?;
        if state.terminal {
            return Some((state_key, 0.0, true));
        }

        let next = state.actions.get(action_id)?.pick(sample)?.next;
        let rec = self.states.get(next.index())?;
        Some((next, rec.reward, rec.terminal || rec.actions.is_empty()))
    }

    fn action(&self, key: StateKey, action_id: &str) -> Option<&ActionRec> {
        self.states
            .get(key.index())?
            .actions
            .iter()
            .find(|action| action.id == action_id)
    }
}

impl MarkovDecisionProcess for CompiledMdp {
    type State = StateKey;
    type Action = String;

    fn states(&self) -> Vec<StateKey> {
        (0..self.states.len()).map(StateKey::from).collect()
    }

    fn initial_state(&self) -> StateKey {
        self.start
    }

    fn actions(&self, state: &StateKey) -> Vec<String> {
        self.states
            .get(state.index())
            .map(|rec| rec.actions.iter().map(|action| action.id.clone()).collect())
            .unwrap_or_default()
    }

    fn transition_probability(&self, next: &StateKey, state: &StateKey, action: &String) -> f64 {
        self.action(*state, action)
            .map(|rec| {
                rec.outcomes
                    .iter()
                    .filter(|outcome| outcome.next == *next)
                    .map(|outcome| outcome.prob)
                    .sum::<f64>()
            })
            .unwrap_or(0.0)
    }

    fn reward(&self, state: &StateKey) -> f64 {
        self.states
            .get(state.index())
            .map(|rec| rec.reward)
            .unwrap_or(0.0)
    }

    fn transitions(&self, state: &StateKey, action: &String) -> Vec<(StateKey, f64)> {
        let Some(rec) = self.action(*state, action) else {
            return Vec::new();
        };

        // Outcomes may repeat a target; merge them so each successor appears once.
        let mut merged: Vec<(StateKey, f64)> = Vec::with_capacity(rec.outcomes.len());
        for outcome in rec.outcomes.iter().filter(|outcome| outcome.prob != 0.0) {
            if let Some(entry) = merged.iter_mut().find(|entry| entry.0 == outcome.next) {
                entry.1 += outcome.prob;
            } else {
                merged.push((outcome.next, outcome.prob));
            }
        }
        merged
    }
}
