//! Identity provider port.
//!
//! The provider owns identities and the single live session. Controllers
//! call it and subscribe to its session stream; they never mutate session
//! state themselves.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::session::{AuthSession, Identity, SessionChange};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The provider rejected the request; the message is classified by
    /// [`crate::auth::AuthError::classify`].
    #[error("{message}")]
    Rejected { message: String },

    /// The provider could not be reached.
    #[error("identity provider unreachable: {0}")]
    Transport(String),
}

impl IdentityError {
    pub fn rejected(message: impl Into<String>) -> Self {
        IdentityError::Rejected {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            IdentityError::Rejected { message } => message,
            IdentityError::Transport(message) => message,
        }
    }
}

/// Result of a successful sign-up call. The session is absent while the
/// email confirmation is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub identity: Identity,
    pub session: Option<AuthSession>,
}

#[async_trait]
pub trait IdentityPort: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError>;

    async fn resend_confirmation(&self, email: &str) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Subscribe to session changes pushed by the provider (sign-in from
    /// any path, confirmation completed elsewhere, sign-out).
    async fn session_events(&self) -> anyhow::Result<mpsc::Receiver<SessionChange>>;
}
