use crate::{
    MarkovDecisionProcess, SolveError, SolverConfig, SweepMetrics, ValueIteration,
    value_iteration,
};

use super::fixtures::{FixtureMdp, branching_chain, recurrent_pair, single_patient};

fn solver(gamma: f64, epsilon: f64) -> ValueIteration {
    ValueIteration::new(SolverConfig::new(gamma, epsilon)).expect("valid config")
}

#[test]
fn single_patient_scenario_reaches_half_survival() {
    let mdp = single_patient();
    let (utilities, report) = solver(1.0, 1e-9).solve(&mdp).expect("solve should succeed");

    assert!(report.converged);
    assert_eq!(utilities.get(&"start"), Some(0.5));
    assert_eq!(utilities.get(&"disease_a"), Some(1.0));
    assert_eq!(utilities.get(&"disease_b"), Some(0.0));
    assert_eq!(utilities.len(), 5);
}

#[test]
fn terminal_states_keep_their_own_reward() {
    let mdp = branching_chain();
    let (utilities, _) = solver(0.9, 1e-9).solve(&mdp).expect("solve should succeed");

    for state in mdp.states() {
        if mdp.actions(&state).is_empty() {
            assert_eq!(utilities.get(&state), Some(mdp.reward(&state)));
        }
    }
}

#[test]
fn branching_chain_matches_hand_computed_values() {
    let mdp = branching_chain();
    let utilities = value_iteration(&mdp, 0.9, 1e-9).expect("solve should succeed");

    let expect = |state: &'static str, value: f64| {
        let got = utilities.get(&state).expect("state has a utility");
        assert!((got - value).abs() < 1e-12, "{state}: expected {value}, got {got}");
    };
    expect("s1", 0.38);
    expect("s2", 0.72);
    expect("s0", 0.648);
}

#[test]
fn zero_discount_yields_rewards_after_one_sweep() {
    let mdp = recurrent_pair();
    let (utilities, report) = solver(0.0, 1e-6).solve(&mdp).expect("solve should succeed");

    assert_eq!(report.sweeps, 1);
    assert!(report.converged);
    for state in mdp.states() {
        assert_eq!(utilities.get(&state), Some(mdp.reward(&state)));
    }
}

#[test]
fn sweep_deltas_contract_by_gamma() {
    let mdp = recurrent_pair();
    let gamma = 0.9;
    let mut deltas = Vec::new();

    let (_, report) = solver(gamma, 1e-10)
        .solve_with_hook(&mdp, |metrics: &SweepMetrics| deltas.push(metrics.delta))
        .expect("solve should succeed");

    assert!(report.converged);
    assert_eq!(deltas.len(), report.sweeps);
    for pair in deltas.windows(2) {
        assert!(
            pair[1] <= gamma * pair[0] + 1e-12,
            "delta grew from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn fifty_sweeps_settle_acyclic_instance() {
    let mdp = branching_chain();
    let config = SolverConfig {
        max_sweeps: 50,
        ..SolverConfig::new(0.9, 1e-6)
    };
    let (_, report) = ValueIteration::new(config)
        .expect("valid config")
        .solve(&mdp)
        .expect("solve should succeed");

    assert!(report.converged);
    assert!(report.sweeps <= 50);
    assert!(report.final_delta < 1e-6);
}

#[test]
fn undiscounted_recurrent_model_reports_non_convergence() {
    let mdp = recurrent_pair();
    let config = SolverConfig {
        max_sweeps: 25,
        ..SolverConfig::new(1.0, 1e-6)
    };
    let (utilities, report) = ValueIteration::new(config)
        .expect("valid config")
        .solve(&mdp)
        .expect("non-convergence is not an error");

    assert!(!report.converged);
    assert_eq!(report.sweeps, 25);
    assert_eq!(utilities.len(), 2);
    assert!(utilities.get(&"home").expect("home utility") > 1.0);
}

#[test]
fn parallel_sweeps_match_sequential_sweeps() {
    let mdp = recurrent_pair();
    let sequential = SolverConfig::new(0.95, 1e-9);
    let parallel = SolverConfig {
        parallel: true,
        ..sequential.clone()
    };

    let (seq_utilities, seq_report) = ValueIteration::new(sequential)
        .expect("valid config")
        .solve(&mdp)
        .expect("solve should succeed");
    let (par_utilities, par_report) = ValueIteration::new(parallel)
        .expect("valid config")
        .solve(&mdp)
        .expect("solve should succeed");

    assert_eq!(seq_utilities, par_utilities);
    assert_eq!(seq_report, par_report);
}

#[test]
fn solve_policy_combines_utilities_and_policy() {
    let mdp = branching_chain();
    let solution = solver(0.9, 1e-9)
        .solve_policy(&mdp)
        .expect("solve should succeed");

    assert!(!solution.is_approximate());
    assert_eq!(solution.policy.len(), mdp.states().len());
    assert_eq!(solution.policy.action(&"s0"), Some(&"right"));
    assert_eq!(solution.policy.action(&"s2"), Some(&"safe"));
    assert_eq!(solution.policy.get(&"good"), Some(None));
}

#[test]
fn empty_model_is_rejected() {
    let mdp = FixtureMdp::new("nowhere");
    let err = solver(0.9, 1e-6).solve(&mdp).expect_err("no states");
    assert!(matches!(err, SolveError::EmptyStateSpace));
}

/// Sparse model that points at a state it never declares.
struct GhostMdp;

impl MarkovDecisionProcess for GhostMdp {
    type State = u8;
    type Action = u8;

    fn states(&self) -> Vec<u8> {
        vec![0, 1]
    }

    fn initial_state(&self) -> u8 {
        0
    }

    fn actions(&self, state: &u8) -> Vec<u8> {
        if *state == 0 { vec![0] } else { Vec::new() }
    }

    fn transition_probability(&self, next: &u8, state: &u8, _action: &u8) -> f64 {
        if *state == 0 && *next == 9 { 1.0 } else { 0.0 }
    }

    fn reward(&self, _state: &u8) -> f64 {
        0.0
    }

    fn transitions(&self, state: &u8, _action: &u8) -> Vec<(u8, f64)> {
        if *state == 0 { vec![(9, 1.0)] } else { Vec::new() }
    }
}

#[test]
fn sparse_successor_outside_state_space_is_an_error() {
    let err = solver(0.9, 1e-6).solve(&GhostMdp).expect_err("state 9 is unknown");
    assert!(matches!(err, SolveError::UnknownSuccessor { ref next, .. } if next == "9"));
}
