//! Auth state machine.
//!
//! Defines a pure state transition function for the login/signup and
//! email-confirmation flow. Collaborator calls and navigation are emitted
//! as actions; their results re-enter as events.

use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Which credential form is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMode {
    Login,
    Signup,
}

impl AuthMode {
    pub fn flipped(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

/// Outcome of the last resend attempt, surfaced transiently on the
/// confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResendOutcome {
    Sent,
    Failed(AuthError),
}

/// Auth flow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// No credential submitted. `error` carries the last failure, if any;
    /// a failed state is not terminal and the next submit retries.
    Anonymous {
        mode: AuthMode,
        error: Option<AuthError>,
    },
    /// One provider call in flight. Guards against duplicate submits.
    Submitting { mode: AuthMode, email: String },
    /// Signed up (or signed in unconfirmed); waiting for the email link.
    AwaitingConfirmation {
        pending_email: String,
        notice: Option<ResendOutcome>,
    },
    /// Resend call in flight; returns to `AwaitingConfirmation`.
    ResendingConfirmation { pending_email: String },
    /// Terminal for this flow; the dashboard takes over.
    Authenticated,
}

impl AuthState {
    pub fn initial() -> Self {
        AuthState::Anonymous {
            mode: AuthMode::Login,
            error: None,
        }
    }
}

/// Events that drive the auth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// User submits the credential form.
    Submit {
        mode: AuthMode,
        email: String,
        password: String,
    },
    /// Provider accepted the sign-in call.
    SignInSucceeded,
    /// Provider accepted the sign-up call; a session is only returned when
    /// confirmation is disabled on the provider side.
    SignUpSucceeded {
        email: String,
        session_returned: bool,
    },
    /// Provider rejected the call; error already classified.
    SubmitFailed { error: AuthError },
    /// The session observer saw a live session (any tab, any path).
    SessionEstablished,
    /// User asks for the confirmation email again.
    RequestResend,
    ResendSucceeded,
    ResendFailed { error: AuthError },
    /// Switch between login and signup forms.
    ToggleMode,
    /// Leave the confirmation screen back to the login form.
    CancelConfirmationWait,
    /// Re-open the confirmation screen for a retained pending email.
    ReenterConfirmationWait { email: String },
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    CallSignIn { email: String, password: String },
    CallSignUp { email: String, password: String },
    CallResendConfirmation { email: String },
    NavigateToDashboard,
}

/// Pure auth state machine. No side effects; unknown state/event pairs
/// keep the current state.
pub struct AuthFlow;

impl AuthFlow {
    pub fn transition(state: AuthState, event: AuthEvent) -> (AuthState, Vec<AuthAction>) {
        match (state, event) {
            // A live session wins from anywhere, exactly once.
            (AuthState::Authenticated, AuthEvent::SessionEstablished) => {
                (AuthState::Authenticated, Vec::new())
            }
            (_, AuthEvent::SessionEstablished) => (
                AuthState::Authenticated,
                vec![AuthAction::NavigateToDashboard],
            ),

            (
                AuthState::Anonymous { .. },
                AuthEvent::Submit {
                    mode,
                    email,
                    password,
                },
            ) => {
                if email.trim().is_empty() {
                    return (
                        AuthState::Anonymous {
                            mode,
                            error: Some(AuthError::EmailRequired),
                        },
                        Vec::new(),
                    );
                }
                if mode == AuthMode::Signup && password.len() < MIN_PASSWORD_LEN {
                    return (
                        AuthState::Anonymous {
                            mode,
                            error: Some(AuthError::PasswordTooShort {
                                min_len: MIN_PASSWORD_LEN,
                            }),
                        },
                        Vec::new(),
                    );
                }
                let action = match mode {
                    AuthMode::Login => AuthAction::CallSignIn {
                        email: email.clone(),
                        password,
                    },
                    AuthMode::Signup => AuthAction::CallSignUp {
                        email: email.clone(),
                        password,
                    },
                };
                (AuthState::Submitting { mode, email }, vec![action])
            }

            (AuthState::Submitting { .. }, AuthEvent::SignInSucceeded) => (
                AuthState::Authenticated,
                vec![AuthAction::NavigateToDashboard],
            ),
            (
                AuthState::Submitting { .. },
                AuthEvent::SignUpSucceeded {
                    email,
                    session_returned,
                },
            ) => {
                if session_returned {
                    // Confirmation disabled on the provider: behaves like a sign-in.
                    (
                        AuthState::Authenticated,
                        vec![AuthAction::NavigateToDashboard],
                    )
                } else {
                    (
                        AuthState::AwaitingConfirmation {
                            pending_email: email,
                            notice: None,
                        },
                        Vec::new(),
                    )
                }
            }
            (AuthState::Submitting { mode, email }, AuthEvent::SubmitFailed { error }) => {
                match error {
                    // An unconfirmed account re-enters the confirmation wait,
                    // even from a login attempt.
                    AuthError::EmailNotConfirmed => (
                        AuthState::AwaitingConfirmation {
                            pending_email: email,
                            notice: None,
                        },
                        Vec::new(),
                    ),
                    // Signup against an existing account: push the user to login.
                    AuthError::AccountAlreadyExists => (
                        AuthState::Anonymous {
                            mode: AuthMode::Login,
                            error: Some(error),
                        },
                        Vec::new(),
                    ),
                    _ => (
                        AuthState::Anonymous {
                            mode,
                            error: Some(error),
                        },
                        Vec::new(),
                    ),
                }
            }

            (AuthState::AwaitingConfirmation { pending_email, .. }, AuthEvent::RequestResend) => (
                AuthState::ResendingConfirmation {
                    pending_email: pending_email.clone(),
                },
                vec![AuthAction::CallResendConfirmation {
                    email: pending_email,
                }],
            ),
            (AuthState::ResendingConfirmation { pending_email }, AuthEvent::ResendSucceeded) => (
                AuthState::AwaitingConfirmation {
                    pending_email,
                    notice: Some(ResendOutcome::Sent),
                },
                Vec::new(),
            ),
            (
                AuthState::ResendingConfirmation { pending_email },
                AuthEvent::ResendFailed { error },
            ) => (
                AuthState::AwaitingConfirmation {
                    pending_email,
                    notice: Some(ResendOutcome::Failed(error)),
                },
                Vec::new(),
            ),
            (AuthState::AwaitingConfirmation { .. }, AuthEvent::CancelConfirmationWait) => (
                AuthState::Anonymous {
                    mode: AuthMode::Login,
                    error: None,
                },
                Vec::new(),
            ),

            (AuthState::Anonymous { .. }, AuthEvent::ReenterConfirmationWait { email }) => (
                AuthState::AwaitingConfirmation {
                    pending_email: email,
                    notice: None,
                },
                Vec::new(),
            ),

            (AuthState::Anonymous { mode, .. }, AuthEvent::ToggleMode) => (
                AuthState::Anonymous {
                    mode: mode.flipped(),
                    error: None,
                },
                Vec::new(),
            ),

            (state, _event) => (state, Vec::new()),
        }
    }
}


const MIN_PASSWORD_LEN: usize = 6;
