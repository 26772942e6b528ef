use std::fmt;

use crate::solver::config::SolverConfigError;

/// Error type for solving and policy extraction.
///
/// States and actions are carried in their `Debug` rendering so the error type stays
/// independent of the model's types.
#[derive(Debug)]
pub enum SolveError {
    /// Solver parameters were rejected before any sweep ran.
    Config(SolverConfigError),
    /// The model reported no states at all.
    EmptyStateSpace,
    /// A sparse transition listed a successor that is not one of `states()`.
    UnknownSuccessor {
        state: String,
        action: String,
        next: String,
    },
    /// A utility mapping handed to policy extraction does not cover a model state.
    MissingUtility { state: String },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Config(err) => write!(f, "{err}"),
            SolveError::EmptyStateSpace => write!(f, "model has no states"),
            SolveError::UnknownSuccessor {
                state,
                action,
                next,
            } => write!(
                f,
                "transition from {state} under {action} reaches unknown state {next}"
            ),
            SolveError::MissingUtility { state } => {
                write!(f, "no utility recorded for state {state}")
            }
        }
    }
}

impl std::error::Error for SolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SolveError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SolverConfigError> for SolveError {
    fn from(value: SolverConfigError) -> Self {
        SolveError::Config(value)
    }
}

/// Well-formedness violations found by the opt-in model validation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    EmptyStateSpace,
    UnknownInitialState {
        state: String,
    },
    InvalidProbability {
        state: String,
        action: String,
        next: String,
        value: f64,
    },
    ProbabilitySum {
        state: String,
        action: String,
        sum: f64,
        tolerance: f64,
    },
    InvalidReward {
        state: String,
        value: f64,
    },
    UnknownSuccessor {
        state: String,
        action: String,
        next: String,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyStateSpace => write!(f, "model has no states"),
            ModelError::UnknownInitialState { state } => {
                write!(f, "initial state {state} is not part of the state space")
            }
            ModelError::InvalidProbability {
                state,
                action,
                next,
                value,
            } => write!(
                f,
                "invalid probability {value} for {state} -> {next} under {action}"
            ),
            ModelError::ProbabilitySum {
                state,
                action,
                sum,
                tolerance,
            } => write!(
                f,
                "probability sum for state {state}, action {action} must be within {tolerance} of 1.0, got {sum}"
            ),
            ModelError::InvalidReward { state, value } => {
                write!(f, "invalid reward {value} for state {state}")
            }
            ModelError::UnknownSuccessor {
                state,
                action,
                next,
            } => write!(
                f,
                "transition from {state} under {action} reaches unknown state {next}"
            ),
        }
    }
}

impl std::error::Error for ModelError {}
