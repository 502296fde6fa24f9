//! # aps-core
//!
//! Core domain models and flow logic for ApplySmart.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod auth;
pub mod config;
pub mod onboarding;
pub mod ports;
pub mod session;

// Re-export commonly used types at the crate root
pub use auth::{AuthAction, AuthError, AuthEvent, AuthFlow, AuthMode, AuthSnapshot, AuthState};
pub use config::AppConfig;
pub use onboarding::{
    OnboardingPatch, OnboardingRecord, StepDraft, StepValidationError, WizardPosition, WizardStep,
};
pub use session::{AuthSession, Identity, IdentityId, SessionChange};
