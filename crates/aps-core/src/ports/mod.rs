//! Port interfaces for the application layer.
//!
//! Ports define the contract between the flow logic (orchestrators) and
//! infrastructure implementations, so the core stays independent of the
//! identity provider, the store, and the UI shell.

pub mod identity;
pub mod navigation;
pub mod notifier;
pub mod onboarding_store;

pub use identity::{IdentityError, IdentityPort, SignUpOutcome};
pub use navigation::{NavigationPort, Screen};
pub use notifier::{Notice, NotifierPort, Severity};
pub use onboarding_store::{JobApplication, OnboardingStorePort, StoreError};
