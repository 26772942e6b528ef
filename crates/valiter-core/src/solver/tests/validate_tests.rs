use crate::{ModelError, validate_model, validate_model_with_tolerance};

use super::fixtures::{FixtureMdp, branching_chain, recurrent_pair, single_patient};

#[test]
fn fixtures_are_well_formed() {
    assert_eq!(validate_model(&single_patient()), Ok(()));
    assert_eq!(validate_model(&branching_chain()), Ok(()));
    assert_eq!(validate_model(&recurrent_pair()), Ok(()));
}

#[test]
fn probability_mass_must_sum_to_one() {
    let mdp = FixtureMdp::new("a")
        .state("a", 0.0)
        .state("b", 0.0)
        .action("a", "leak", &[("b", 0.9)]);

    let err = validate_model(&mdp).expect_err("mass is missing");
    assert!(matches!(err, ModelError::ProbabilitySum { sum, .. } if (sum - 0.9).abs() < 1e-12));
}

#[test]
fn tolerance_is_configurable() {
    let mdp = FixtureMdp::new("a")
        .state("a", 0.0)
        .state("b", 0.0)
        .action("a", "almost", &[("b", 0.999)]);

    assert!(validate_model(&mdp).is_err());
    assert_eq!(validate_model_with_tolerance(&mdp, 1e-2), Ok(()));
}

#[test]
fn probabilities_outside_unit_interval_are_rejected() {
    let mdp = FixtureMdp::new("a")
        .state("a", 0.0)
        .state("b", 0.0)
        .action("a", "odd", &[("a", -0.5), ("b", 1.5)]);

    let err = validate_model(&mdp).expect_err("negative probability");
    assert!(matches!(err, ModelError::InvalidProbability { value, .. } if value == -0.5));
}

#[test]
fn initial_state_must_be_declared() {
    let mdp = FixtureMdp::new("missing").state("a", 0.0);
    let err = validate_model(&mdp).expect_err("start is undeclared");
    assert!(matches!(err, ModelError::UnknownInitialState { .. }));
}

#[test]
fn rewards_must_be_finite() {
    let mdp = FixtureMdp::new("a").state("a", f64::NAN);
    let err = validate_model(&mdp).expect_err("reward is NaN");
    assert!(matches!(err, ModelError::InvalidReward { .. }));
}

#[test]
fn empty_state_space_is_rejected() {
    let err = validate_model(&FixtureMdp::new("a")).expect_err("no states");
    assert_eq!(err, ModelError::EmptyStateSpace);
}
