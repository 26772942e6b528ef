use log::{debug, info, warn};
use rayon::prelude::*;

use crate::solver::{
    config::SolverConfig,
    error::SolveError,
    ids::StateIndex,
    process::MarkovDecisionProcess,
    solution::{Solution, SolveReport, Utilities},
    table::TransitionTable,
};

/// Per-sweep metrics emitted by the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepMetrics {
    /// 1-based sweep number.
    pub sweep: usize,
    /// Largest absolute utility change produced by this sweep.
    pub delta: f64,
}

/// Synchronous value-iteration solver.
#[derive(Debug, Clone)]
pub struct ValueIteration {
    config: SolverConfig,
}

impl ValueIteration {
    /// Create a solver, rejecting invalid parameters up front.
    pub fn new(config: SolverConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(ValueIteration { config })
    }

    /// Compute utilities for every state of `mdp`.
    pub fn solve<M>(&self, mdp: &M) -> Result<(Utilities<M::State>, SolveReport), SolveError>
    where
        M: MarkovDecisionProcess + ?Sized,
    {
        self.solve_with_hook(mdp, |_| {})
    }

    /// Compute utilities and invoke a callback after each completed sweep.
    pub fn solve_with_hook<M, FHook>(
        &self,
        mdp: &M,
        on_sweep: FHook,
    ) -> Result<(Utilities<M::State>, SolveReport), SolveError>
    where
        M: MarkovDecisionProcess + ?Sized,
        FHook: FnMut(&SweepMetrics),
    {
        let table = TransitionTable::compile(mdp)?;
        let (values, report) = self.solve_table(&table, on_sweep);
        Ok((table.utilities_from(&values), report))
    }

    /// Compute utilities and extract the greedy policy from a single compiled table.
    pub fn solve_policy<M>(&self, mdp: &M) -> Result<Solution<M::State, M::Action>, SolveError>
    where
        M: MarkovDecisionProcess + ?Sized,
    {
        let table = TransitionTable::compile(mdp)?;
        let (values, report) = self.solve_table(&table, |_| {});
        let policy = table
            .states()
            .map(|(index, state)| (state.clone(), table.greedy_action(index, &values).cloned()))
            .collect();

        Ok(Solution {
            utilities: table.utilities_from(&values),
            policy,
            report,
        })
    }

    /// Run the sweep loop over an already compiled table.
    ///
    /// Returns utilities in table index order. `previous` and `next` are two distinct
    /// buffers swapped at each sweep boundary; a sweep never reads what it writes.
    pub(crate) fn solve_table<S, A, FHook>(
        &self,
        table: &TransitionTable<S, A>,
        mut on_sweep: FHook,
    ) -> (Vec<f64>, SolveReport)
    where
        S: Clone + Eq + std::hash::Hash + Sync,
        A: Sync,
        FHook: FnMut(&SweepMetrics),
    {
        let threshold = self.config.stopping_threshold();
        let mut previous = vec![0.0; table.len()];
        let mut next = vec![0.0; table.len()];
        let mut report = SolveReport {
            sweeps: 0,
            final_delta: f64::INFINITY,
            threshold,
            converged: false,
        };

        for sweep in 1..=self.config.max_sweeps {
            self.sweep(table, &previous, &mut next);

            let delta = previous
                .iter()
                .zip(&next)
                .map(|(old, new)| (new - old).abs())
                .fold(0.0, f64::max);
            std::mem::swap(&mut previous, &mut next);

            let metrics = SweepMetrics { sweep, delta };
            debug!("sweep {sweep}: delta={delta:e} threshold={threshold:e}");
            on_sweep(&metrics);

            report.sweeps = sweep;
            report.final_delta = delta;
            if delta < threshold {
                report.converged = true;
                break;
            }
        }

        if report.converged {
            info!(
                "value iteration converged after {} sweeps over {} states (delta={:e})",
                report.sweeps,
                table.len(),
                report.final_delta
            );
        } else {
            warn!(
                "value iteration did not converge within {} sweeps (delta={:e}, threshold={:e})",
                report.sweeps, report.final_delta, threshold
            );
        }

        (previous, report)
    }

    fn sweep<S, A>(&self, table: &TransitionTable<S, A>, previous: &[f64], next: &mut [f64])
    where
        S: Clone + Eq + std::hash::Hash + Sync,
        A: Sync,
    {
        let gamma = self.config.gamma;
        if self.config.parallel {
            next.par_iter_mut().enumerate().for_each(|(idx, value)| {
                *value = table.backup(StateIndex::from(idx), previous, gamma);
            });
        } else {
            for (idx, value) in next.iter_mut().enumerate() {
                *value = table.backup(StateIndex::from(idx), previous, gamma);
            }
        }
    }
}

/// Solve `mdp` with discount `gamma` and tolerance `epsilon`, returning only the utilities.
pub fn value_iteration<M>(
    mdp: &M,
    gamma: f64,
    epsilon: f64,
) -> Result<Utilities<M::State>, SolveError>
where
    M: MarkovDecisionProcess + ?Sized,
{
    let solver = ValueIteration::new(SolverConfig::new(gamma, epsilon))?;
    let (utilities, _) = solver.solve(mdp)?;
    Ok(utilities)
}
