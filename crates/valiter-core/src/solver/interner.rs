use std::collections::HashMap;
use std::hash::Hash;

use crate::solver::ids::StateIndex;

/// Sorted, duplicate-free state list with reverse lookup.
///
/// Index `i` always holds the `i`-th smallest state, whatever order the states were
/// supplied in.
#[derive(Debug, Clone)]
pub(crate) struct StateInterner<S>
where
    S: Clone + Eq + Hash,
{
    states: Vec<S>,
    positions: HashMap<S, StateIndex>,
}

impl<S> StateInterner<S>
where
    S: Clone + Eq + Hash + Ord,
{
    pub(crate) fn canonical(mut states: Vec<S>) -> Self {
        states.sort();
        states.dedup();

        let positions = states
            .iter()
            .enumerate()
            .map(|(idx, state)| (state.clone(), StateIndex::from(idx)))
            .collect();
        StateInterner { states, positions }
    }
}

impl<S> StateInterner<S>
where
    S: Clone + Eq + Hash,
{
    pub(crate) fn index_of(&self, state: &S) -> Option<StateIndex> {
        self.positions.get(state).copied()
    }

    /// Iterate states in ascending order together with their indices.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (StateIndex, &S)> {
        self.states
            .iter()
            .enumerate()
            .map(|(idx, state)| (StateIndex::from(idx), state))
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
