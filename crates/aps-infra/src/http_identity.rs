//! HTTP identity provider adapter.
//!
//! Talks to a GoTrue-style REST auth service. The adapter also owns the
//! session-change feed: its own successful sign-in/sign-up and sign-out
//! calls are pushed to subscribers, which is how the session observer
//! sees them.

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use aps_core::config::IdentityConfig;
use aps_core::ports::{IdentityError, IdentityPort, SignUpOutcome};
use aps_core::session::{AuthSession, Identity, IdentityId, SessionChange};

const SESSION_FEED_CAPACITY: usize = 16;

pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: StdMutex<Option<String>>,
    session_feed: StdMutex<Option<mpsc::Sender<SessionChange>>>,
}

impl HttpIdentityProvider {
    pub fn new(config: &IdentityConfig) -> Self {
        Self::from_parts(config.base_url.clone(), config.anon_key.clone())
    }

    pub fn from_parts(base_url: String, anon_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            access_token: StdMutex::new(None),
            session_feed: StdMutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn push_change(&self, change: SessionChange) {
        let feed = self.session_feed.lock().map(|guard| guard.clone());
        if let Ok(Some(tx)) = feed {
            if tx.try_send(change).is_err() {
                warn!("session feed full or closed; change dropped");
            }
        }
    }

    fn remember_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.lock() {
            *guard = token;
        }
    }

    fn bearer_token(&self) -> String {
        self.access_token
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    async fn post_json<B: Serialize>(
        &self,
        url: String,
        body: &B,
    ) -> Result<reqwest::Response, IdentityError> {
        self.client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer_token())
            .json(body)
            .send()
            .await
            .map_err(|err| IdentityError::Transport(err.to_string()))
    }
}

#[async_trait]
impl IdentityPort for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, IdentityError> {
        let url = format!(
            "{}?grant_type=password",
            self.endpoint("/auth/v1/token")
        );
        let response = self
            .post_json(url, &CredentialsBody { email, password })
            .await?;
        let body: SessionBody = parse_response(response).await?;
        let session = body.into_session()?;
        debug!(user = %session.identity.id, "sign-in accepted");
        self.remember_token(Some(session.access_token.clone()));
        self.push_change(SessionChange::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, IdentityError> {
        let response = self
            .post_json(
                self.endpoint("/auth/v1/signup"),
                &CredentialsBody { email, password },
            )
            .await?;
        let body: SignUpBody = parse_response(response).await?;
        match body {
            SignUpBody::WithSession(session_body) => {
                // Confirmation disabled on the provider side.
                let session = session_body.into_session()?;
                self.remember_token(Some(session.access_token.clone()));
                self.push_change(SessionChange::SignedIn(session.clone()));
                Ok(SignUpOutcome {
                    identity: session.identity.clone(),
                    session: Some(session),
                })
            }
            SignUpBody::UserOnly(user) => {
                debug!(email = %user.email, "sign-up accepted; confirmation pending");
                Ok(SignUpOutcome {
                    identity: user.into_identity(),
                    session: None,
                })
            }
        }
    }

    async fn resend_confirmation(&self, email: &str) -> Result<(), IdentityError> {
        let response = self
            .post_json(
                self.endpoint("/auth/v1/resend"),
                &ResendBody {
                    kind: "signup",
                    email,
                },
            )
            .await?;
        expect_success(response).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let response = self
            .post_json(self.endpoint("/auth/v1/logout"), &EmptyBody {})
            .await?;
        self.remember_token(None);
        self.push_change(SessionChange::SignedOut);
        // An already-expired token still means "signed out" locally.
        if !response.status().is_success() {
            debug!(status = %response.status(), "logout returned non-success; ignored");
        }
        Ok(())
    }

    async fn session_events(&self) -> anyhow::Result<mpsc::Receiver<SessionChange>> {
        let (tx, rx) = mpsc::channel(SESSION_FEED_CAPACITY);
        match self.session_feed.lock() {
            Ok(mut guard) => {
                *guard = Some(tx);
                Ok(rx)
            }
            Err(_) => Err(anyhow::anyhow!("session feed lock poisoned")),
        }
    }
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct ResendBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct EmptyBody {}

#[derive(Debug, Deserialize)]
struct SessionBody {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: UserBody,
}

impl SessionBody {
    fn into_session(self) -> Result<AuthSession, IdentityError> {
        let expires_at = Utc::now() + Duration::seconds(self.expires_in);
        Ok(AuthSession {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            identity: self.user.into_identity(),
            expires_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    email: String,
    #[serde(default)]
    email_confirmed_at: Option<String>,
}

impl UserBody {
    fn into_identity(self) -> Identity {
        Identity {
            id: IdentityId::new(self.id),
            email: self.email,
            email_confirmed: self.email_confirmed_at.is_some(),
        }
    }
}

/// Sign-up returns a full session when auto-confirm is on, otherwise just
/// the created user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    WithSession(SessionBody),
    UserOnly(UserBody),
}

async fn parse_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|err| IdentityError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(IdentityError::rejected(extract_error_message(&text)));
    }
    serde_json::from_str(&text)
        .map_err(|err| IdentityError::Transport(format!("unexpected response body: {err}")))
}

async fn expect_success(response: reqwest::Response) -> Result<(), IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let text = response.text().await.unwrap_or_default();
    Err(IdentityError::rejected(extract_error_message(&text)))
}

/// GoTrue error bodies vary between `error_description`, `msg` and
/// `error`; fall back to the raw body so nothing is silently dropped.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    body.to_string()
}
