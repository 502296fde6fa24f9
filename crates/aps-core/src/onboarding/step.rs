//! Wizard step model and resume-position derivation.

use serde::{Deserialize, Serialize};

use crate::onboarding::OnboardingRecord;

/// The three wizard steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WizardStep {
    /// Full name, desired role, preferred location.
    Basics,
    /// Experience band and salary expectations.
    Experience,
    /// Skills, availability, remote preference.
    Preferences,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::Basics;
    pub const LAST: WizardStep = WizardStep::Preferences;

    /// 1-based step number as stored in the record.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Basics => 1,
            WizardStep::Experience => 2,
            WizardStep::Preferences => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<WizardStep> {
        match n {
            1 => Some(WizardStep::Basics),
            2 => Some(WizardStep::Experience),
            3 => Some(WizardStep::Preferences),
            _ => None,
        }
    }

    pub fn next(self) -> Option<WizardStep> {
        WizardStep::from_number(self.number() + 1)
    }

    pub fn prev(self) -> Option<WizardStep> {
        self.number().checked_sub(1).and_then(WizardStep::from_number)
    }
}

/// Where the wizard resumes, or that it is already done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardPosition {
    Step(WizardStep),
    Completed,
}

/// Derive the resume position from a stored record.
///
/// `completed_steps` is the source of truth: the resume step is one past
/// the highest completed step, clamped to the wizard range. The stored
/// `current_step` counter is redundant and can drift, so it is ignored
/// here. Completion is decided solely by the `onboarding_completed` flag;
/// a stored counter of 4 on its own does not complete the wizard.
pub fn resume_position(record: &OnboardingRecord) -> WizardPosition {
    if record.onboarding_completed {
        return WizardPosition::Completed;
    }
    let next = record
        .completed_steps
        .iter()
        .max()
        .map_or(1, |highest| highest.saturating_add(1));
    let step = WizardStep::from_number(next.clamp(1, WizardStep::LAST.number()))
        .unwrap_or(WizardStep::FIRST);
    WizardPosition::Step(step)
}
