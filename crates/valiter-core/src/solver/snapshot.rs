use std::fmt;

use serde::Serialize;

use crate::solver::{config::SolverConfig, solution::Solution};

/// Serializable view of a solve, one row per state in ascending state order.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionSnapshot {
    pub gamma: f64,
    pub epsilon: f64,
    pub sweeps: usize,
    pub final_delta: f64,
    pub converged: bool,
    pub rows: Vec<SolutionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionRow {
    pub state: String,
    pub utility: f64,
    /// `None` for terminal states.
    pub action: Option<String>,
}

impl SolutionSnapshot {
    /// Render `solution` with caller-provided state and action labels.
    pub fn from_solution<S, A, FState, FAction>(
        solution: &Solution<S, A>,
        config: &SolverConfig,
        mut state_label: FState,
        mut action_label: FAction,
    ) -> Self
    where
        S: Ord,
        FState: FnMut(&S) -> String,
        FAction: FnMut(&A) -> String,
    {
        let rows = solution
            .policy
            .iter()
            .map(|(state, action)| SolutionRow {
                state: state_label(state),
                utility: solution.utilities.get(state).unwrap_or(f64::NAN),
                action: action.map(&mut action_label),
            })
            .collect();

        SolutionSnapshot {
            gamma: config.gamma,
            epsilon: config.epsilon,
            sweeps: solution.report.sweeps,
            final_delta: solution.report.final_delta,
            converged: solution.report.converged,
            rows,
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(SnapshotError::Json)
    }

    pub fn to_yaml(&self) -> Result<String, SnapshotError> {
        serde_yaml::to_string(self).map_err(SnapshotError::Yaml)
    }
}

/// Error type for rendering a `SolutionSnapshot`.
#[derive(Debug)]
pub enum SnapshotError {
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Json(err) => write!(f, "failed to render JSON snapshot: {err}"),
            SnapshotError::Yaml(err) => write!(f, "failed to render YAML snapshot: {err}"),
        }
    }
}

impl std::error::Error for SnapshotError {}
