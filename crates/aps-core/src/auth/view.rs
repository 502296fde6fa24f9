//! Immutable view projection of the auth flow.

use serde::Serialize;

use crate::auth::{AuthMode, AuthState};

/// Snapshot published to subscribers on every state change.
///
/// `pending_email` merges the retained email (kept by the orchestrator
/// across a cancelled confirmation wait) with the one carried by the
/// current state, so a resend stays possible after leaving and re-entering
/// the confirmation screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthSnapshot {
    pub state: AuthState,
    pub pending_email: Option<String>,
}

impl AuthSnapshot {
    pub fn new(state: AuthState, retained_email: Option<String>) -> Self {
        let pending_email = match &state {
            AuthState::AwaitingConfirmation { pending_email, .. }
            | AuthState::ResendingConfirmation { pending_email } => {
                Some(pending_email.clone())
            }
            _ => retained_email,
        };
        Self {
            state,
            pending_email,
        }
    }

    /// One provider call in flight; re-entrant operations are no-ops.
    pub fn busy(&self) -> bool {
        matches!(
            self.state,
            AuthState::Submitting { .. } | AuthState::ResendingConfirmation { .. }
        )
    }

    pub fn awaiting_confirmation(&self) -> bool {
        matches!(
            self.state,
            AuthState::AwaitingConfirmation { .. } | AuthState::ResendingConfirmation { .. }
        )
    }

    /// Active form mode, when a form is showing.
    pub fn mode(&self) -> Option<AuthMode> {
        match &self.state {
            AuthState::Anonymous { mode, .. } | AuthState::Submitting { mode, .. } => Some(*mode),
            _ => None,
        }
    }
}
