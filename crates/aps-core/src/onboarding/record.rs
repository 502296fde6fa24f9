//! Persisted onboarding aggregate and its partial-update patch.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::IdentityId;

/// The incrementally-built profile produced by the wizard, keyed by the
/// owning identity. Mutated additively, one step's fields at a time; never
/// deleted by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    pub user_id: IdentityId,

    // Step 1: basics
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub desired_role: String,
    #[serde(default)]
    pub desired_location: String,

    // Step 2: experience and salary
    #[serde(default)]
    pub experience_band: String,
    #[serde(default)]
    pub expected_salary: String,
    #[serde(default)]
    pub current_salary: Option<String>,

    // Step 3: skills and preferences
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub availability: String,
    #[serde(default)]
    pub remote_preference: String,

    // Wizard progress
    #[serde(default = "first_step")]
    pub current_step: u8,
    #[serde(default)]
    pub completed_steps: BTreeSet<u8>,
    #[serde(default)]
    pub onboarding_completed: bool,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn first_step() -> u8 {
    1
}

impl OnboardingRecord {
    /// Empty record for an identity that has not entered the wizard yet.
    pub fn fresh(user_id: IdentityId) -> Self {
        Self {
            user_id,
            full_name: String::new(),
            desired_role: String::new(),
            desired_location: String::new(),
            experience_band: String::new(),
            expected_salary: String::new(),
            current_salary: None,
            skills: Vec::new(),
            availability: String::new(),
            remote_preference: String::new(),
            current_step: 1,
            completed_steps: BTreeSet::new(),
            onboarding_completed: false,
            updated_at: Utc::now(),
        }
    }

    /// Merge a patch into this record. Absent patch fields keep their
    /// current value; this is what makes a step upsert safe to retry and
    /// keeps earlier steps intact.
    pub fn apply(&mut self, patch: OnboardingPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.desired_role {
            self.desired_role = v;
        }
        if let Some(v) = patch.desired_location {
            self.desired_location = v;
        }
        if let Some(v) = patch.experience_band {
            self.experience_band = v;
        }
        if let Some(v) = patch.expected_salary {
            self.expected_salary = v;
        }
        if let Some(v) = patch.current_salary {
            self.current_salary = Some(v);
        }
        if let Some(v) = patch.skills {
            self.skills = v;
        }
        if let Some(v) = patch.availability {
            self.availability = v;
        }
        if let Some(v) = patch.remote_preference {
            self.remote_preference = v;
        }
        if let Some(v) = patch.current_step {
            self.current_step = v;
        }
        if let Some(v) = patch.completed_steps {
            self.completed_steps = v;
        }
        if let Some(v) = patch.onboarding_completed {
            self.onboarding_completed = v;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial update over [`OnboardingRecord`]. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPatch {
    pub full_name: Option<String>,
    pub desired_role: Option<String>,
    pub desired_location: Option<String>,
    pub experience_band: Option<String>,
    pub expected_salary: Option<String>,
    pub current_salary: Option<String>,
    pub skills: Option<Vec<String>>,
    pub availability: Option<String>,
    pub remote_preference: Option<String>,
    pub current_step: Option<u8>,
    pub completed_steps: Option<BTreeSet<u8>>,
    pub onboarding_completed: Option<bool>,
}

impl OnboardingPatch {
    /// Wizard bookkeeping for advancing past `step`: the step joins the
    /// completed set and the counter moves one past it.
    pub fn with_step_advance(mut self, step: u8, completed: &BTreeSet<u8>) -> Self {
        let mut completed = completed.clone();
        completed.insert(step);
        self.completed_steps = Some(completed);
        self.current_step = Some(step + 1);
        self
    }
}
