use std::collections::BTreeMap;

/// Converged utility per state, iterated in ascending state order.
#[derive(Debug, Clone, PartialEq)]
pub struct Utilities<S: Ord> {
    values: BTreeMap<S, f64>,
}

impl<S: Ord> Utilities<S> {
    /// Return the utility of `state`, if it was computed.
    pub fn get(&self, state: &S) -> Option<f64> {
        self.values.get(state).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
        self.values.iter().map(|(state, value)| (state, *value))
    }
}

impl<S: Ord> FromIterator<(S, f64)> for Utilities<S> {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Utilities {
            values: iter.into_iter().collect(),
        }
    }
}

/// Chosen action per state. Terminal states map to an explicit `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy<S: Ord, A> {
    actions: BTreeMap<S, Option<A>>,
}

impl<S: Ord, A> Policy<S, A> {
    /// Return the decision for `state`: `None` when the state is unknown,
    /// `Some(None)` when it is terminal.
    pub fn get(&self, state: &S) -> Option<Option<&A>> {
        self.actions.get(state).map(Option::as_ref)
    }

    /// Return the chosen action for `state`, flattening terminal and unknown states.
    pub fn action(&self, state: &S) -> Option<&A> {
        self.get(state).flatten()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, Option<&A>)> {
        self.actions
            .iter()
            .map(|(state, action)| (state, action.as_ref()))
    }
}

impl<S: Ord, A> FromIterator<(S, Option<A>)> for Policy<S, A> {
    fn from_iter<I: IntoIterator<Item = (S, Option<A>)>>(iter: I) -> Self {
        Policy {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Outcome of the sweep loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub sweeps: usize,
    pub final_delta: f64,
    pub threshold: f64,
    /// `false` when `max_sweeps` ran out first; the utilities are then a best effort.
    pub converged: bool,
}

/// Utilities, greedy policy and run report of one solve.
#[derive(Debug, Clone)]
pub struct Solution<S: Ord, A> {
    pub utilities: Utilities<S>,
    pub policy: Policy<S, A>,
    pub report: SolveReport,
}

impl<S: Ord, A> Solution<S, A> {
    /// Whether the policy comes from a converged run rather than a best-effort estimate.
    pub fn is_approximate(&self) -> bool {
        !self.report.converged
    }
}
