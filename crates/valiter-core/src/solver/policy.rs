use crate::solver::{
    error::SolveError,
    process::MarkovDecisionProcess,
    solution::{Policy, Utilities},
    table::TransitionTable,
};

/// Derive the greedy policy of `mdp` from a utility mapping.
///
/// Every state of the model gets an entry; states with no legal actions map to `None`.
/// Ties between actions with exactly equal expected utility go to the smallest action in
/// the action type's `Ord` order. Extraction does not modify `utilities` and returns the
/// same policy for the same inputs.
pub fn extract_policy<M>(
    mdp: &M,
    utilities: &Utilities<M::State>,
) -> Result<Policy<M::State, M::Action>, SolveError>
where
    M: MarkovDecisionProcess + ?Sized,
{
    let table = TransitionTable::compile(mdp)?;
    extract_from_table(&table, utilities)
}

/// Greedy policy over an already compiled table.
pub(crate) fn extract_from_table<S, A>(
    table: &TransitionTable<S, A>,
    utilities: &Utilities<S>,
) -> Result<Policy<S, A>, SolveError>
where
    S: Clone + Eq + std::hash::Hash + Ord + std::fmt::Debug,
    A: Clone,
{
    let values = table.values_from(utilities)?;
    Ok(table
        .states()
        .map(|(index, state)| (state.clone(), table.greedy_action(index, &values).cloned()))
        .collect())
}
