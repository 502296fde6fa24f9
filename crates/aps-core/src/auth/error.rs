//! Auth error taxonomy.
//!
//! Provider failures arrive as free-text messages; [`AuthError::classify`]
//! maps them onto the kinds the flow reacts to. Unclassified messages are
//! kept verbatim so they are surfaced, never dropped.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address not confirmed yet")]
    EmailNotConfirmed,

    #[error("an account with this email already exists")]
    AccountAlreadyExists,

    #[error("email is required")]
    EmailRequired,

    #[error("password must be at least {min_len} characters long")]
    PasswordTooShort { min_len: usize },

    #[error("{0}")]
    Generic(String),
}

impl AuthError {
    /// Classify a provider error message by its known marker phrases.
    pub fn classify(message: &str) -> Self {
        if message.contains("Invalid login credentials") {
            AuthError::InvalidCredentials
        } else if message.contains("Email not confirmed") {
            AuthError::EmailNotConfirmed
        } else if message.contains("User already registered") {
            AuthError::AccountAlreadyExists
        } else {
            AuthError::Generic(message.to_string())
        }
    }
}
