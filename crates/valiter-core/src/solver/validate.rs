use crate::solver::{error::ModelError, process::MarkovDecisionProcess};

/// Tolerance used when checking that outgoing probabilities sum to 1.
pub const PROB_TOLERANCE: f64 = 1e-9;

/// Check the model's well-formedness with the default tolerance.
pub fn validate_model<M>(mdp: &M) -> Result<(), ModelError>
where
    M: MarkovDecisionProcess + ?Sized,
{
    validate_model_with_tolerance(mdp, PROB_TOLERANCE)
}

/// Opt-in well-formedness pass; the solver itself never runs it.
///
/// Walks every `(next, state, action)` triple, so it costs one brute-force pass over the
/// transition function.
pub fn validate_model_with_tolerance<M>(mdp: &M, tolerance: f64) -> Result<(), ModelError>
where
    M: MarkovDecisionProcess + ?Sized,
{
    let states = mdp.states();
    if states.is_empty() {
        return Err(ModelError::EmptyStateSpace);
    }

    let initial = mdp.initial_state();
    if !states.contains(&initial) {
        return Err(ModelError::UnknownInitialState {
            state: format!("{initial:?}"),
        });
    }

    for state in &states {
        let reward = mdp.reward(state);
        if !reward.is_finite() {
            return Err(ModelError::InvalidReward {
                state: format!("{state:?}"),
                value: reward,
            });
        }

        for action in mdp.actions(state) {
            let mut sum = 0.0_f64;
            for next in &states {
                let prob = mdp.transition_probability(next, state, &action);
                if !prob.is_finite() || !(0.0..=1.0).contains(&prob) {
                    return Err(ModelError::InvalidProbability {
                        state: format!("{state:?}"),
                        action: format!("{action:?}"),
                        next: format!("{next:?}"),
                        value: prob,
                    });
                }
                sum += prob;
            }

            // Outgoing probabilities of a legal action must sum to 1 within tolerance.
            if (sum - 1.0).abs() > tolerance {
                return Err(ModelError::ProbabilitySum {
                    state: format!("{state:?}"),
                    action: format!("{action:?}"),
                    sum,
                    tolerance,
                });
            }

            for (next, _) in mdp.transitions(state, &action) {
                if !states.contains(&next) {
                    return Err(ModelError::UnknownSuccessor {
                        state: format!("{state:?}"),
                        action: format!("{action:?}"),
                        next: format!("{next:?}"),
                    });
                }
            }
        }
    }

    Ok(())
}
