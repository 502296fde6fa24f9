//! Auth flow domain module.
//!
//! Defines the login/signup/email-confirmation state machine and its
//! error taxonomy. The machine is pure; side effects come back as
//! [`AuthAction`]s for the orchestration layer to execute.

pub mod error;
pub mod state_machine;
pub mod view;

pub use error::AuthError;
pub use state_machine::{AuthAction, AuthEvent, AuthFlow, AuthMode, AuthState, ResendOutcome};
pub use view::AuthSnapshot;
