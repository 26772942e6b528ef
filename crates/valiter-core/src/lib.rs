mod solver;

pub use solver::config::{SolverConfig, SolverConfigError};
pub use solver::error::{ModelError, SolveError};
pub use solver::policy::extract_policy;
pub use solver::process::MarkovDecisionProcess;
pub use solver::snapshot::{SnapshotError, SolutionRow, SolutionSnapshot};
pub use solver::solution::{Policy, Solution, SolveReport, Utilities};
pub use solver::validate::{PROB_TOLERANCE, validate_model, validate_model_with_tolerance};
pub use solver::value_iteration::{SweepMetrics, ValueIteration, value_iteration};
