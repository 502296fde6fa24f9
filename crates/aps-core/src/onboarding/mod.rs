//! Onboarding wizard domain module.
//!
//! The persisted [`OnboardingRecord`] is built additively, one step at a
//! time, through merge-upserts of [`OnboardingPatch`]es. The editable
//! [`StepDraft`] buffers all fields in string form and converts them at
//! commit time.

pub mod draft;
pub mod record;
pub mod step;

pub use draft::{normalize_skills, DraftField, StepDraft, StepValidationError};
pub use record::{OnboardingPatch, OnboardingRecord};
pub use step::{resume_position, WizardPosition, WizardStep};
