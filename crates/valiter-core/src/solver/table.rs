use crate::solver::{
    error::SolveError,
    ids::StateIndex,
    interner::StateInterner,
    process::MarkovDecisionProcess,
    solution::Utilities,
};

#[derive(Debug, Clone)]
/// Index-resolved snapshot of a decision process.
///
/// States are stored in ascending order and each state's actions in ascending order, so
/// every computation over the table is independent of how the model enumerates them.
pub(crate) struct TransitionTable<S, A>
where
    S: Clone + Eq + std::hash::Hash,
{
    states: StateInterner<S>,
    rows: Vec<StateRow<A>>,
}

#[derive(Debug, Clone)]
struct StateRow<A> {
    reward: f64,
    actions: Vec<ActionRow<A>>,
}

#[derive(Debug, Clone)]
struct ActionRow<A> {
    action: A,
    successors: Vec<(StateIndex, f64)>,
}

impl<S, A> TransitionTable<S, A>
where
    S: Clone + Eq + std::hash::Hash + Ord + std::fmt::Debug,
    A: Clone + Ord + std::fmt::Debug,
{
    /// Query `mdp` once for every state, action and successor.
    pub(crate) fn compile<M>(mdp: &M) -> Result<Self, SolveError>
    where
        M: MarkovDecisionProcess<State = S, Action = A> + ?Sized,
    {
        let states = StateInterner::canonical(mdp.states());
        if states.is_empty() {
            return Err(SolveError::EmptyStateSpace);
        }

        let mut rows = Vec::with_capacity(states.len());
        for (_, state) in states.iter() {
            let mut actions = mdp.actions(state);
            actions.sort();
            actions.dedup();

            let mut action_rows = Vec::with_capacity(actions.len());
            for action in actions {
                let mut successors = Vec::new();
                for (next, prob) in mdp.transitions(state, &action) {
                    let next_index =
                        states
                            .index_of(&next)
                            .ok_or_else(|| SolveError::UnknownSuccessor {
                                state: format!("{state:?}"),
                                action: format!("{action:?}"),
                                next: format!("{next:?}"),
                            })?;
                    successors.push((next_index, prob));
                }
                // Fixed summation order keeps expected utilities bit-identical across runs.
                successors.sort_by_key(|(next, _)| *next);

                action_rows.push(ActionRow { action, successors });
            }

            rows.push(StateRow {
                reward: mdp.reward(state),
                actions: action_rows,
            });
        }

        Ok(Self { states, rows })
    }
}

impl<S, A> TransitionTable<S, A>
where
    S: Clone + Eq + std::hash::Hash,
{
    /// Return the number of states.
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate states in canonical order.
    pub(crate) fn states(&self) -> impl Iterator<Item = (StateIndex, &S)> {
        self.states.iter()
    }

    /// One Bellman backup for the state at `index`, reading only `previous`.
    ///
    /// Terminal states carry their own reward with no lookahead.
    pub(crate) fn backup(&self, index: StateIndex, previous: &[f64], gamma: f64) -> f64 {
        let row = &self.rows[index.index()];
        if row.actions.is_empty() {
            return row.reward;
        }

        let best = row
            .actions
            .iter()
            .map(|action| expected_utility(&action.successors, previous))
            .fold(f64::NEG_INFINITY, f64::max);

        row.reward + gamma * best
    }

    /// Action maximizing expected next-state utility, or `None` for terminal states.
    ///
    /// Ties resolve to the first maximizing action in ascending order; values are compared
    /// exactly.
    pub(crate) fn greedy_action(&self, index: StateIndex, values: &[f64]) -> Option<&A> {
        let row = self.rows.get(index.index())?;
        let mut best: Option<(&A, f64)> = None;

        for action in &row.actions {
            let candidate = expected_utility(&action.successors, values);
            best = match best {
                Some((best_action, best_value)) if best_value >= candidate => {
                    Some((best_action, best_value))
                }
                _ => Some((&action.action, candidate)),
            };
        }

        best.map(|(action, _)| action)
    }

    /// Lay `utilities` out in index order.
    pub(crate) fn values_from(&self, utilities: &Utilities<S>) -> Result<Vec<f64>, SolveError>
    where
        S: Ord + std::fmt::Debug,
    {
        self.states
            .iter()
            .map(|(_, state)| {
                utilities
                    .get(state)
                    .ok_or_else(|| SolveError::MissingUtility {
                        state: format!("{state:?}"),
                    })
            })
            .collect()
    }

    /// Pair index-ordered values back up with their states.
    pub(crate) fn utilities_from(&self, values: &[f64]) -> Utilities<S>
    where
        S: Ord,
    {
        self.states
            .iter()
            .zip(values)
            .map(|((_, state), value)| (state.clone(), *value))
            .collect()
    }
}

fn expected_utility(successors: &[(StateIndex, f64)], values: &[f64]) -> f64 {
    successors
        .iter()
        .map(|(next, prob)| prob * values[next.index()])
        .sum()
}
