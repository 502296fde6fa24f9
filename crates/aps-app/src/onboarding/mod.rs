//! Onboarding wizard orchestration.

pub mod orchestrator;

pub use orchestrator::{OnboardingError, OnboardingOrchestrator, OnboardingSnapshot};
