//! # aps-app
//!
//! ApplySmart orchestration layer.
//!
//! This crate coordinates the pure flow logic from `aps-core` with the
//! identity, store, navigation and notification ports: the auth
//! orchestrator, the onboarding wizard orchestrator, and the process-wide
//! session observer they both read.

pub mod auth;
pub mod onboarding;
pub mod session_observer;

pub use auth::{AuthOrchestrator, AuthOrchestratorError};
pub use onboarding::{OnboardingError, OnboardingOrchestrator, OnboardingSnapshot};
pub use session_observer::SessionObserver;
