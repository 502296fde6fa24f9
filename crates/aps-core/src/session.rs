//! Identity and session domain models.
//!
//! Both are owned by the identity provider; controllers only read them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque identifier of a registered account, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generate a fresh random id (tests and local fixtures).
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for IdentityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IdentityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A registered account reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    /// Whether the confirmation link has been clicked.
    pub email_confirmed: bool,
}

/// A live authenticated credential bound to an [`Identity`].
///
/// At most one session exists at a time; it is created or replaced by
/// sign-in/sign-up success and destroyed by sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn identity_id(&self) -> &IdentityId {
        &self.identity.id
    }
}

/// Push event on the identity provider's session stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(AuthSession),
    SignedOut,
}
