//! Patient-triage decision process.
//!
//! Patients arrive one at a time, each carrying a disease drawn from a fixed distribution.
//! The clinic discharges the patient home or admits them to its single hospital bed. An
//! admission occupies the bed for a stay drawn uniformly from `1..=max_hospital_hours`, and
//! every processed patient advances the clock by one hour. Being in a state whose previous
//! patient survived pays a reward of 1.

use std::{collections::BTreeMap, fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use valiter_core::{MarkovDecisionProcess, PROB_TOLERANCE};

use crate::MdpError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    /// No patient present: the initial state and the goal states.
    Unassigned,
    Flu,
    Cough,
    Ebola,
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Clinic decisions.
///
/// Variants are declared in lexicographic order so that the derived `Ord`, which breaks
/// ties during policy extraction, is the alphabetical order of the names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageAction {
    AdmitToHospital,
    BeginProcessing,
    DischargeHome,
}

impl fmt::Display for TriageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriageState {
    /// 0 before the day starts, `patients + 1` once every patient was processed.
    pub patient: u32,
    pub disease: Disease,
    /// Hours until the hospital bed is free again.
    pub hospital_hours: u32,
    pub last_survived: bool,
}

impl TriageState {
    pub fn new(patient: u32, disease: Disease, hospital_hours: u32, last_survived: bool) -> Self {
        TriageState {
            patient,
            disease,
            hospital_hours,
            last_survived,
        }
    }
}

impl fmt::Display for TriageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.patient, self.disease, self.hospital_hours, self.last_survived
        )
    }
}

/// Arrival probability and survival odds of one disease.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiseaseProfile {
    pub disease: Disease,
    pub probability: f64,
    pub survival_home: f64,
    pub survival_hospital: f64,
}

impl DiseaseProfile {
    fn survival(&self, action: TriageAction) -> f64 {
        match action {
            TriageAction::AdmitToHospital => self.survival_hospital,
            TriageAction::DischargeHome => self.survival_home,
            TriageAction::BeginProcessing => 0.0,
        }
    }
}

/// Parameters of a triage instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageParams {
    pub patients: u32,
    pub max_hospital_hours: u32,
    pub diseases: Vec<DiseaseProfile>,
}

impl Default for TriageParams {
    fn default() -> Self {
        TriageParams {
            patients: 3,
            max_hospital_hours: 2,
            diseases: vec![
                DiseaseProfile {
                    disease: Disease::Flu,
                    probability: 0.8,
                    survival_home: 1.0,
                    survival_hospital: 1.0,
                },
                DiseaseProfile {
                    disease: Disease::Cough,
                    probability: 0.1,
                    survival_home: 0.5,
                    survival_hospital: 1.0,
                },
                DiseaseProfile {
                    disease: Disease::Ebola,
                    probability: 0.1,
                    survival_home: 0.0,
                    survival_hospital: 0.25,
                },
            ],
        }
    }
}

impl TriageParams {
    /// Default disease tables with the given size.
    pub fn new(patients: u32, max_hospital_hours: u32) -> Self {
        TriageParams {
            patients,
            max_hospital_hours,
            ..TriageParams::default()
        }
    }

    /// Parse triage parameters from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MdpError> {
        let params: TriageParams = serde_yaml::from_str(yaml)?;
        params.validate()?;
        Ok(params)
    }

    /// Parse triage parameters from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, MdpError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), MdpError> {
        if self.patients == 0 {
            return Err(MdpError::InvalidTriageParams(
                "patients must be greater than 0".to_string(),
            ));
        }
        if self.max_hospital_hours == 0 {
            return Err(MdpError::InvalidTriageParams(
                "max_hospital_hours must be greater than 0".to_string(),
            ));
        }
        if self.diseases.is_empty() {
            return Err(MdpError::InvalidTriageParams(
                "at least one disease is required".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(self.diseases.len());
        let mut sum = 0.0_f64;
        for profile in &self.diseases {
            if profile.disease == Disease::Unassigned {
                return Err(MdpError::InvalidTriageParams(
                    "unassigned is reserved for states without a patient".to_string(),
                ));
            }
            if seen.contains(&profile.disease) {
                return Err(MdpError::InvalidTriageParams(format!(
                    "disease {} is listed twice",
                    profile.disease
                )));
            }
            seen.push(profile.disease);

            for (name, value) in [
                ("probability", profile.probability),
                ("survival_home", profile.survival_home),
                ("survival_hospital", profile.survival_hospital),
            ] {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(MdpError::InvalidTriageParams(format!(
                        "{name} of {} must be within [0, 1], got {value}",
                        profile.disease
                    )));
                }
            }
            sum += profile.probability;
        }

        if (sum - 1.0).abs() > PROB_TOLERANCE {
            return Err(MdpError::InvalidTriageParams(format!(
                "disease probabilities must sum to 1.0, got {sum}"
            )));
        }

        Ok(())
    }
}

/// Triage instance with its state space enumerated up front.
#[derive(Debug, Clone)]
pub struct PatientTriage {
    patients: u32,
    max_hospital_hours: u32,
    profiles: BTreeMap<Disease, DiseaseProfile>,
    states: Vec<TriageState>,
}

impl PatientTriage {
    pub fn new(params: TriageParams) -> Result<Self, MdpError> {
        params.validate()?;

        let profiles: BTreeMap<Disease, DiseaseProfile> = params
            .diseases
            .iter()
            .map(|profile| (profile.disease, *profile))
            .collect();

        let patients = params.patients;
        let max_hours = params.max_hospital_hours;
        let mut states = vec![TriageState::new(0, Disease::Unassigned, 0, false)];

        // Nobody occupies the bed and nobody was treated before the first patient.
        for disease in profiles.keys() {
            states.push(TriageState::new(1, *disease, 0, false));
        }
        for patient in 2..=patients {
            for disease in profiles.keys() {
                for hours in 0..max_hours {
                    for survived in [false, true] {
                        states.push(TriageState::new(patient, *disease, hours, survived));
                    }
                }
            }
        }
        for hours in 0..max_hours {
            for survived in [false, true] {
                states.push(TriageState::new(
                    patients + 1,
                    Disease::Unassigned,
                    hours,
                    survived,
                ));
            }
        }

        Ok(PatientTriage {
            patients,
            max_hospital_hours: max_hours,
            profiles,
            states,
        })
    }

    fn arrival_probability(&self, disease: Disease) -> f64 {
        self.profiles
            .get(&disease)
            .map(|profile| profile.probability)
            .unwrap_or(0.0)
    }

    fn survival(&self, disease: Disease, action: TriageAction) -> f64 {
        self.profiles
            .get(&disease)
            .map(|profile| profile.survival(action))
            .unwrap_or(0.0)
    }

    fn is_legal(&self, state: &TriageState, action: TriageAction) -> bool {
        match action {
            TriageAction::BeginProcessing => {
                state.patient == 0 && state.disease == Disease::Unassigned
            }
            TriageAction::DischargeHome => state.disease != Disease::Unassigned,
            TriageAction::AdmitToHospital => {
                state.disease != Disease::Unassigned && state.hospital_hours == 0
            }
        }
    }
}

impl MarkovDecisionProcess for PatientTriage {
    type State = TriageState;
    type Action = TriageAction;

    fn states(&self) -> Vec<TriageState> {
        self.states.clone()
    }

    fn initial_state(&self) -> TriageState {
        TriageState::new(0, Disease::Unassigned, 0, false)
    }

    fn actions(&self, state: &TriageState) -> Vec<TriageAction> {
        [
            TriageAction::AdmitToHospital,
            TriageAction::BeginProcessing,
            TriageAction::DischargeHome,
        ]
        .into_iter()
        .filter(|action| self.is_legal(state, *action))
        .collect()
    }

    fn transition_probability(
        &self,
        next: &TriageState,
        state: &TriageState,
        action: &TriageAction,
    ) -> f64 {
        if !self.is_legal(state, *action) || next.patient != state.patient + 1 {
            return 0.0;
        }

        if *action == TriageAction::BeginProcessing {
            if next.hospital_hours != 0 || next.last_survived {
                return 0.0;
            }
            return self.arrival_probability(next.disease);
        }

        // Past the last patient only goal states follow.
        let arrival = if state.patient == self.patients {
            if next.disease == Disease::Unassigned {
                1.0
            } else {
                0.0
            }
        } else {
            self.arrival_probability(next.disease)
        };

        let stay = match action {
            TriageAction::AdmitToHospital if next.hospital_hours < self.max_hospital_hours => {
                1.0 / f64::from(self.max_hospital_hours)
            }
            TriageAction::DischargeHome
                if next.hospital_hours == state.hospital_hours.saturating_sub(1) =>
            {
                1.0
            }
            _ => 0.0,
        };

        let survival = self.survival(state.disease, *action);
        let outcome = if next.last_survived {
            survival
        } else {
            1.0 - survival
        };

        arrival * stay * outcome
    }

    fn reward(&self, state: &TriageState) -> f64 {
        if state.last_survived { 1.0 } else { 0.0 }
    }

    fn transitions(&self, state: &TriageState, action: &TriageAction) -> Vec<(TriageState, f64)> {
        if !self.is_legal(state, *action) {
            return Vec::new();
        }

        let patient = state.patient + 1;
        let diseases: Vec<Disease> =
            if *action == TriageAction::BeginProcessing || patient <= self.patients {
                self.profiles.keys().copied().collect()
            } else {
                vec![Disease::Unassigned]
            };

        let mut successors = Vec::new();
        for disease in diseases {
            for hours in 0..self.max_hospital_hours {
                for survived in [false, true] {
                    let next = TriageState::new(patient, disease, hours, survived);
                    let prob = self.transition_probability(&next, state, action);
                    if prob != 0.0 {
                        successors.push((next, prob));
                    }
                }
            }
        }
        successors
    }
}
