use proptest::prelude::*;
use valiter_core::{MarkovDecisionProcess, SolverConfig, ValueIteration, validate_model};
use valiter_mdp::{
    Disease, DiseaseProfile, MdpError, PatientTriage, TriageAction, TriageParams, TriageState,
};

const TRIAGE_PARAMS_YAML: &str = include_str!("../models/triage.params.yaml");

fn triage(patients: u32, max_hospital_hours: u32) -> PatientTriage {
    PatientTriage::new(TriageParams::new(patients, max_hospital_hours)).expect("valid params")
}

fn assert_mass_is_conserved(mdp: &PatientTriage) {
    for state in mdp.states() {
        for action in mdp.actions(&state) {
            let sum: f64 = mdp
                .transitions(&state, &action)
                .iter()
                .map(|(_, prob)| prob)
                .sum();
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "{state} {action}: probabilities sum to {sum}"
            );
        }
    }
}

#[test]
fn state_space_matches_instance_size() {
    let mdp = triage(3, 2);
    // initial + first patient per disease + inner patients + goal states
    let expected = 1 + 3 + 2 * 3 * 2 * 2 + 2 * 2;
    assert_eq!(mdp.states().len(), expected);
    assert!(mdp.states().contains(&mdp.initial_state()));
}

#[test]
fn reference_instance_is_well_formed() {
    let mdp = triage(3, 2);
    assert_eq!(validate_model(&mdp), Ok(()));
    assert_mass_is_conserved(&mdp);
}

#[test]
fn sparse_transitions_agree_with_transition_probability() {
    let mdp = triage(2, 3);
    let states = mdp.states();

    for state in &states {
        for action in mdp.actions(state) {
            let sparse = mdp.transitions(state, &action);
            for next in &states {
                let dense = mdp.transition_probability(next, state, &action);
                let listed = sparse
                    .iter()
                    .find(|(candidate, _)| candidate == next)
                    .map(|(_, prob)| *prob)
                    .unwrap_or(0.0);
                assert_eq!(dense, listed, "{state} -> {next} under {action}");
            }
        }
    }
}

#[test]
fn initial_state_has_no_predecessor() {
    let mdp = triage(3, 2);
    let initial = mdp.initial_state();

    for state in mdp.states() {
        for action in mdp.actions(&state) {
            assert_eq!(mdp.transition_probability(&initial, &state, &action), 0.0);
        }
    }
}

#[test]
fn action_sets_follow_bed_occupancy() {
    let mdp = triage(2, 2);

    assert_eq!(
        mdp.actions(&mdp.initial_state()),
        vec![TriageAction::BeginProcessing]
    );
    assert_eq!(
        mdp.actions(&TriageState::new(2, Disease::Cough, 0, true)),
        vec![TriageAction::AdmitToHospital, TriageAction::DischargeHome]
    );
    assert_eq!(
        mdp.actions(&TriageState::new(2, Disease::Cough, 1, true)),
        vec![TriageAction::DischargeHome]
    );
    assert!(
        mdp.actions(&TriageState::new(3, Disease::Unassigned, 1, true))
            .is_empty()
    );
}

#[test]
fn illegal_actions_have_zero_probability() {
    let mdp = triage(2, 2);
    let busy = TriageState::new(2, Disease::Ebola, 1, false);
    let goal = TriageState::new(3, Disease::Unassigned, 0, true);

    assert_eq!(
        mdp.transition_probability(&goal, &busy, &TriageAction::AdmitToHospital),
        0.0
    );
    assert!(
        mdp.transitions(&busy, &TriageAction::BeginProcessing)
            .is_empty()
    );
}

#[test]
fn single_patient_utility_is_expected_survival() {
    let mdp = triage(1, 2);
    let (utilities, report) = ValueIteration::new(SolverConfig::new(1.0, 1e-9))
        .expect("valid config")
        .solve(&mdp)
        .expect("solve should succeed");

    assert!(report.converged);
    let initial = utilities.get(&mdp.initial_state()).expect("initial utility");
    // flu survives either way, cough and ebola are best admitted
    let expected = 0.8 * 1.0 + 0.1 * 1.0 + 0.1 * 0.25;
    assert!((initial - expected).abs() < 1e-12, "got {initial}");
}

#[test]
fn solved_policy_saves_the_bed_for_sicker_patients() {
    let mdp = triage(2, 2);
    let solution = ValueIteration::new(SolverConfig::new(0.9, 1e-9))
        .expect("valid config")
        .solve_policy(&mdp)
        .expect("solve should succeed");

    let action = |patient, disease, hours, survived| {
        solution
            .policy
            .get(&TriageState::new(patient, disease, hours, survived))
            .expect("state is part of the model")
            .copied()
    };

    assert_eq!(
        action(0, Disease::Unassigned, 0, false),
        Some(TriageAction::BeginProcessing)
    );
    assert_eq!(
        action(1, Disease::Flu, 0, false),
        Some(TriageAction::DischargeHome)
    );
    assert_eq!(
        action(1, Disease::Ebola, 0, false),
        Some(TriageAction::AdmitToHospital)
    );
    assert_eq!(
        action(2, Disease::Cough, 0, true),
        Some(TriageAction::AdmitToHospital)
    );
    assert_eq!(
        action(2, Disease::Cough, 1, false),
        Some(TriageAction::DischargeHome)
    );
    assert_eq!(action(3, Disease::Unassigned, 1, true), None);
}

#[test]
fn goal_states_carry_only_their_reward() {
    let mdp = triage(2, 2);
    let (utilities, _) = ValueIteration::new(SolverConfig::new(0.9, 1e-9))
        .expect("valid config")
        .solve(&mdp)
        .expect("solve should succeed");

    for state in mdp.states() {
        if mdp.is_terminal(&state) {
            assert_eq!(utilities.get(&state), Some(mdp.reward(&state)));
        }
    }
}

#[test]
fn fifty_sweeps_settle_the_reference_instance() {
    let mdp = triage(3, 2);
    let config = SolverConfig {
        max_sweeps: 50,
        ..SolverConfig::new(0.9, 1e-6)
    };
    let mut deltas = Vec::new();
    let (_, report) = ValueIteration::new(config)
        .expect("valid config")
        .solve_with_hook(&mdp, |metrics| deltas.push(metrics.delta))
        .expect("solve should succeed");

    assert!(report.converged);
    assert!(report.final_delta < 1e-6);
    for pair in deltas.windows(2) {
        assert!(pair[1] <= 0.9 * pair[0] + 1e-12);
    }
}

#[test]
fn params_yaml_matches_defaults() {
    let params = TriageParams::from_yaml_str(TRIAGE_PARAMS_YAML).expect("yaml should parse");
    assert_eq!(params, TriageParams::default());
}

#[test]
fn invalid_params_are_rejected() {
    let cases = [
        TriageParams::new(0, 2),
        TriageParams::new(2, 0),
        TriageParams {
            diseases: Vec::new(),
            ..TriageParams::default()
        },
        TriageParams {
            diseases: vec![DiseaseProfile {
                disease: Disease::Flu,
                probability: 0.5,
                survival_home: 1.0,
                survival_hospital: 1.0,
            }],
            ..TriageParams::default()
        },
        TriageParams {
            diseases: vec![DiseaseProfile {
                disease: Disease::Unassigned,
                probability: 1.0,
                survival_home: 1.0,
                survival_hospital: 1.0,
            }],
            ..TriageParams::default()
        },
        TriageParams {
            diseases: vec![DiseaseProfile {
                disease: Disease::Cough,
                probability: 1.0,
                survival_home: 1.5,
                survival_hospital: 1.0,
            }],
            ..TriageParams::default()
        },
    ];

    for params in cases {
        let err = PatientTriage::new(params.clone()).expect_err("params should be rejected");
        assert!(
            matches!(err, MdpError::InvalidTriageParams(_)),
            "unexpected error for {params:?}: {err}"
        );
    }
}

#[test]
fn duplicate_diseases_are_rejected() {
    let mut params = TriageParams::default();
    params.diseases.push(params.diseases[0]);
    assert!(matches!(
        params.validate(),
        Err(MdpError::InvalidTriageParams(msg)) if msg.contains("twice")
    ));
}

proptest! {
    #[test]
    fn every_instance_conserves_probability(patients in 1u32..4, hours in 1u32..4) {
        let mdp = triage(patients, hours);
        prop_assert_eq!(validate_model(&mdp), Ok(()));
        assert_mass_is_conserved(&mdp);
    }
}
