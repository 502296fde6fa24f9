//! Auth orchestration.
//!
//! Drives the pure auth state machine, executes its actions against the
//! identity provider, and surfaces every outcome through the notifier.

pub mod context;
pub mod orchestrator;

pub use context::AuthContext;
pub use orchestrator::{AuthOrchestrator, AuthOrchestratorError};
