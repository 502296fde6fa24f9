//! Editable wizard buffer.
//!
//! Everything is held as plain strings while editing; conversion to the
//! record's shape (notably skills as an ordered list) happens only when a
//! step commits.

use serde::Serialize;

use crate::onboarding::{OnboardingPatch, OnboardingRecord, WizardStep};

/// Validation failure for a single wizard step. Local only; never reaches
/// the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("at least one skill is required")]
    NoSkills,
}

/// Fields addressable from the form layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    FullName,
    DesiredRole,
    DesiredLocation,
    ExperienceBand,
    ExpectedSalary,
    CurrentSalary,
    Skills,
    Availability,
    RemotePreference,
}

/// The in-progress form buffer for all three steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepDraft {
    pub full_name: String,
    pub desired_role: String,
    pub desired_location: String,
    pub experience_band: String,
    pub expected_salary: String,
    pub current_salary: String,
    /// Comma-delimited while editing.
    pub skills: String,
    pub availability: String,
    pub remote_preference: String,
}

impl StepDraft {
    /// Seed the buffer from a stored record (resume case).
    pub fn seed(record: &OnboardingRecord) -> Self {
        Self {
            full_name: record.full_name.clone(),
            desired_role: record.desired_role.clone(),
            desired_location: record.desired_location.clone(),
            experience_band: record.experience_band.clone(),
            expected_salary: record.expected_salary.clone(),
            current_salary: record.current_salary.clone().unwrap_or_default(),
            skills: record.skills.join(", "),
            availability: record.availability.clone(),
            remote_preference: record.remote_preference.clone(),
        }
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        match field {
            DraftField::FullName => self.full_name = value,
            DraftField::DesiredRole => self.desired_role = value,
            DraftField::DesiredLocation => self.desired_location = value,
            DraftField::ExperienceBand => self.experience_band = value,
            DraftField::ExpectedSalary => self.expected_salary = value,
            DraftField::CurrentSalary => self.current_salary = value,
            DraftField::Skills => self.skills = value,
            DraftField::Availability => self.availability = value,
            DraftField::RemotePreference => self.remote_preference = value,
        }
    }

    /// Check the required fields of one step. Current salary is the only
    /// optional field.
    pub fn validate(&self, step: WizardStep) -> Result<(), StepValidationError> {
        match step {
            WizardStep::Basics => {
                require(&self.full_name, "full name")?;
                require(&self.desired_role, "desired job role")?;
                require(&self.desired_location, "preferred location")
            }
            WizardStep::Experience => {
                require(&self.experience_band, "years of experience")?;
                require(&self.expected_salary, "expected salary range")
            }
            WizardStep::Preferences => {
                if normalize_skills(&self.skills).is_empty() {
                    return Err(StepValidationError::NoSkills);
                }
                require(&self.availability, "availability")?;
                require(&self.remote_preference, "work preference")
            }
        }
    }

    /// Build the partial update for exactly one step's fields. Completing
    /// the last step also sets the completion flag.
    pub fn patch_for(&self, step: WizardStep) -> OnboardingPatch {
        match step {
            WizardStep::Basics => OnboardingPatch {
                full_name: Some(self.full_name.clone()),
                desired_role: Some(self.desired_role.clone()),
                desired_location: Some(self.desired_location.clone()),
                ..Default::default()
            },
            WizardStep::Experience => OnboardingPatch {
                experience_band: Some(self.experience_band.clone()),
                expected_salary: Some(self.expected_salary.clone()),
                current_salary: if self.current_salary.trim().is_empty() {
                    None
                } else {
                    Some(self.current_salary.clone())
                },
                ..Default::default()
            },
            WizardStep::Preferences => OnboardingPatch {
                skills: Some(normalize_skills(&self.skills)),
                availability: Some(self.availability.clone()),
                remote_preference: Some(self.remote_preference.clone()),
                onboarding_completed: Some(true),
                ..Default::default()
            },
        }
    }
}

/// Split the free-text skills field on commas, trim whitespace, drop empty
/// tokens, preserve order.
pub fn normalize_skills(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

fn require(value: &str, field: &'static str) -> Result<(), StepValidationError> {
    if value.trim().is_empty() {
        Err(StepValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_skills, StepDraft, StepValidationError};
    use crate::onboarding::{OnboardingRecord, WizardStep};
    use crate::session::IdentityId;

    fn filled_draft() -> StepDraft {
        StepDraft {
            full_name: "Ada Lovelace".into(),
            desired_role: "Software Engineer".into(),
            desired_location: "Remote".into(),
            experience_band: "4-6".into(),
            expected_salary: "$80,000 - $100,000".into(),
            current_salary: String::new(),
            skills: "React, Node.js, Python".into(),
            availability: "immediate".into(),
            remote_preference: "remote".into(),
        }
    }

    #[test]
    fn normalize_skills_trims_and_drops_empty_tokens() {
        assert_eq!(
            normalize_skills("React, Node.js ,, Python"),
            vec!["React".to_string(), "Node.js".into(), "Python".into()]
        );
    }

    #[test]
    fn normalize_skills_of_blank_input_is_empty() {
        assert!(normalize_skills("").is_empty());
        assert!(normalize_skills("  , ,  ").is_empty());
    }

    #[test]
    fn validate_step_one_requires_all_basics() {
        let mut draft = filled_draft();
        assert_eq!(draft.validate(WizardStep::Basics), Ok(()));
        draft.desired_role = "   ".into();
        assert_eq!(
            draft.validate(WizardStep::Basics),
            Err(StepValidationError::MissingField("desired job role"))
        );
    }

    #[test]
    fn validate_step_two_allows_missing_current_salary() {
        let draft = filled_draft();
        assert_eq!(draft.validate(WizardStep::Experience), Ok(()));
    }

    #[test]
    fn validate_step_three_needs_one_real_skill_token() {
        let mut draft = filled_draft();
        draft.skills = " ,  , ".into();
        assert_eq!(
            draft.validate(WizardStep::Preferences),
            Err(StepValidationError::NoSkills)
        );
    }

    #[test]
    fn patch_for_a_step_carries_only_that_steps_fields() {
        let draft = filled_draft();
        let patch = draft.patch_for(WizardStep::Basics);
        assert_eq!(patch.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(patch.experience_band.is_none());
        assert!(patch.skills.is_none());
        assert!(patch.onboarding_completed.is_none());
    }

    #[test]
    fn patch_for_last_step_sets_completion_and_normalized_skills() {
        let mut draft = filled_draft();
        draft.skills = "React, Node.js ,, Python".into();
        let patch = draft.patch_for(WizardStep::Preferences);
        assert_eq!(
            patch.skills,
            Some(vec!["React".to_string(), "Node.js".into(), "Python".into()])
        );
        assert_eq!(patch.onboarding_completed, Some(true));
    }

    #[test]
    fn blank_current_salary_does_not_enter_the_patch() {
        let draft = filled_draft();
        let patch = draft.patch_for(WizardStep::Experience);
        assert!(patch.current_salary.is_none());
    }

    #[test]
    fn seed_round_trips_skills_through_the_delimited_form() {
        let mut record = OnboardingRecord::fresh(IdentityId::random());
        record.skills = vec!["React".into(), "Python".into()];
        let draft = StepDraft::seed(&record);
        assert_eq!(draft.skills, "React, Python");
        assert_eq!(normalize_skills(&draft.skills), record.skills);
    }
}
