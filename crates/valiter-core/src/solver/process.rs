use std::fmt::Debug;
use std::hash::Hash;

/// Query surface a finite Markov decision process exposes to the solver.
///
/// Every method is a pure query. States and actions must be totally ordered: the solver
/// sorts them once so results never depend on enumeration order, and the action order is
/// the tie-break order used by policy extraction.
pub trait MarkovDecisionProcess {
    type State: Clone + Eq + Hash + Ord + Debug + Send + Sync;
    type Action: Clone + Eq + Hash + Ord + Debug + Send + Sync;

    /// Return every state of the process.
    fn states(&self) -> Vec<Self::State>;

    /// Return the entry state. It must be one of `states()`.
    fn initial_state(&self) -> Self::State;

    /// Return the legal actions in `state`. An empty list marks a terminal state.
    fn actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Probability of landing in `next` after taking `action` in `state`.
    /// Returns 0 for any combination the model does not describe, including illegal actions.
    fn transition_probability(
        &self,
        next: &Self::State,
        state: &Self::State,
        action: &Self::Action,
    ) -> f64;

    /// Immediate reward attached to being in `state`.
    fn reward(&self, state: &Self::State) -> f64;

    /// Successors of `(state, action)` with nonzero probability.
    ///
    /// The default walks `states()` and asks `transition_probability` for each one.
    /// Models that store transitions sparsely should override it.
    fn transitions(&self, state: &Self::State, action: &Self::Action) -> Vec<(Self::State, f64)> {
        self.states()
            .into_iter()
            .filter_map(|next| {
                let prob = self.transition_probability(&next, state, action);
                (prob != 0.0).then_some((next, prob))
            })
            .collect()
    }

    /// Return whether `state` has no legal actions.
    fn is_terminal(&self, state: &Self::State) -> bool {
        self.actions(state).is_empty()
    }
}
