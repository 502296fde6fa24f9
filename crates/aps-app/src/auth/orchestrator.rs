//! Auth orchestrator.
//!
//! Serializes transitions through the shared context, executes the
//! machine's actions against the identity provider, and feeds the results
//! back in as events. Navigation fires exactly once per authentication,
//! whichever of the controller's own call or the session observer wins.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use aps_core::auth::{
    AuthAction, AuthError, AuthEvent, AuthFlow, AuthMode, AuthSnapshot, AuthState,
};
use aps_core::ports::{IdentityError, IdentityPort, NavigationPort, Notice, NotifierPort, Screen};

use crate::auth::AuthContext;
use crate::session_observer::SessionObserver;

#[derive(Debug, thiserror::Error)]
pub enum AuthOrchestratorError {
    #[error("no pending email to resend a confirmation to")]
    NoPendingEmail,
}

pub struct AuthOrchestrator {
    context: AuthContext,
    identity: Arc<dyn IdentityPort>,
    navigation: Arc<dyn NavigationPort>,
    notifier: Arc<dyn NotifierPort>,
    /// Survives `cancel_confirmation_wait`, so a resend stays possible
    /// after leaving and re-entering the confirmation screen.
    pending_email: Mutex<Option<String>>,
    session_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl AuthOrchestrator {
    pub fn new(
        identity: Arc<dyn IdentityPort>,
        navigation: Arc<dyn NavigationPort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            context: AuthContext::default(),
            identity,
            navigation,
            notifier,
            pending_email: Mutex::new(None),
            session_watcher: Mutex::new(None),
        }
    }

    /// React to the session observer: a live session from any path (own
    /// call, another tab) authenticates this flow. The task holds only a
    /// weak handle, so a change arriving after the orchestrator is gone
    /// is discarded instead of applied.
    pub async fn watch_sessions(self: &Arc<Self>, observer: &SessionObserver) {
        let weak = Arc::downgrade(self);
        let mut rx = observer.subscribe();
        let task = tokio::spawn(async move {
            if rx.borrow_and_update().is_some() {
                if let Some(orchestrator) = weak.upgrade() {
                    orchestrator.dispatch(AuthEvent::SessionEstablished).await;
                }
            }
            while rx.changed().await.is_ok() {
                let signed_in = rx.borrow_and_update().is_some();
                if !signed_in {
                    continue;
                }
                let Some(orchestrator) = weak.upgrade() else {
                    break;
                };
                orchestrator.dispatch(AuthEvent::SessionEstablished).await;
            }
        });
        *self.session_watcher.lock().await = Some(task);
    }

    pub async fn shutdown(&self) {
        if let Some(task) = self.session_watcher.lock().await.take() {
            task.abort();
        }
    }

    /// Submit the credential form. A submit while a call is in flight is
    /// a no-op; a failed state retries.
    pub async fn submit(&self, mode: AuthMode, email: String, password: String) -> AuthSnapshot {
        let snapshot = self
            .dispatch(AuthEvent::Submit {
                mode,
                email,
                password,
            })
            .await;
        // Local guard failures never reach `run_action`, so they are
        // surfaced here.
        if let AuthState::Anonymous {
            error: Some(error @ (AuthError::EmailRequired | AuthError::PasswordTooShort { .. })),
            ..
        } = &snapshot.state
        {
            self.notifier
                .notify(Notice::error("Invalid Input", error.to_string()));
        }
        snapshot
    }

    /// Resend the confirmation email to the pending address, re-opening
    /// the confirmation screen first when it was cancelled.
    pub async fn resend_confirmation(&self) -> Result<AuthSnapshot, AuthOrchestratorError> {
        let snapshot = self.snapshot().await;
        if !snapshot.awaiting_confirmation() {
            let email = snapshot
                .pending_email
                .clone()
                .ok_or(AuthOrchestratorError::NoPendingEmail)?;
            self.dispatch(AuthEvent::ReenterConfirmationWait { email })
                .await;
        }
        Ok(self.dispatch(AuthEvent::RequestResend).await)
    }

    pub async fn toggle_mode(&self) -> AuthSnapshot {
        self.dispatch(AuthEvent::ToggleMode).await
    }

    pub async fn cancel_confirmation_wait(&self) -> AuthSnapshot {
        self.dispatch(AuthEvent::CancelConfirmationWait).await
    }

    /// Sign out and return to the home screen. The flow resets to its
    /// initial anonymous state.
    pub async fn sign_out(&self) -> AuthSnapshot {
        if let Err(err) = self.identity.sign_out().await {
            warn!(error = %err, "sign-out call failed; clearing local state anyway");
        }
        {
            let _guard = self.context.acquire_dispatch_lock().await;
            *self.pending_email.lock().await = None;
            self.context.set_state(AuthState::initial()).await;
            self.publish().await;
        }
        self.navigation.go_to(Screen::Home);
        self.snapshot().await
    }

    pub async fn snapshot(&self) -> AuthSnapshot {
        AuthSnapshot::new(
            self.context.get_state().await,
            self.pending_email.lock().await.clone(),
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.context.subscribe()
    }

    async fn dispatch(&self, event: AuthEvent) -> AuthSnapshot {
        let mut event = Some(event);
        while let Some(ev) = event.take() {
            let actions = {
                let _guard = self.context.acquire_dispatch_lock().await;
                let current = self.context.get_state().await;
                let (next, actions) = AuthFlow::transition(current, ev);
                self.retain_pending_email(&next).await;
                self.context.set_state(next).await;
                self.publish().await;
                actions
            };
            for action in actions {
                if let Some(follow_up) = self.run_action(action).await {
                    event = Some(follow_up);
                }
            }
        }
        self.snapshot().await
    }

    async fn retain_pending_email(&self, next: &AuthState) {
        if let AuthState::AwaitingConfirmation { pending_email, .. }
        | AuthState::ResendingConfirmation { pending_email } = next
        {
            *self.pending_email.lock().await = Some(pending_email.clone());
        }
    }

    async fn publish(&self) {
        let snapshot = AuthSnapshot::new(
            self.context.get_state().await,
            self.pending_email.lock().await.clone(),
        );
        self.context.publish(snapshot);
    }

    /// Execute one side effect; collaborator results come back as events.
    async fn run_action(&self, action: AuthAction) -> Option<AuthEvent> {
        match action {
            AuthAction::CallSignIn { email, password } => {
                debug!(email = %email, "sign-in call issued");
                match self.identity.sign_in(&email, &password).await {
                    Ok(_session) => {
                        self.notifier.notify(Notice::info(
                            "Success!",
                            "Welcome back! Redirecting to dashboard...",
                        ));
                        Some(AuthEvent::SignInSucceeded)
                    }
                    Err(err) => {
                        let error = classify(&err);
                        warn!(error = %err, "sign-in rejected");
                        self.notify_failure(AuthMode::Login, &error);
                        Some(AuthEvent::SubmitFailed { error })
                    }
                }
            }
            AuthAction::CallSignUp { email, password } => {
                debug!(email = %email, "sign-up call issued");
                match self.identity.sign_up(&email, &password).await {
                    Ok(outcome) => {
                        let session_returned = outcome.session.is_some();
                        if !session_returned {
                            self.notifier.notify(Notice::info(
                                "Check Your Email",
                                "We've sent you a confirmation link. Please check your email \
                                 and click the link to activate your account.",
                            ));
                        }
                        Some(AuthEvent::SignUpSucceeded {
                            email,
                            session_returned,
                        })
                    }
                    Err(err) => {
                        let error = classify(&err);
                        warn!(error = %err, "sign-up rejected");
                        self.notify_failure(AuthMode::Signup, &error);
                        Some(AuthEvent::SubmitFailed { error })
                    }
                }
            }
            AuthAction::CallResendConfirmation { email } => {
                debug!(email = %email, "resend confirmation issued");
                match self.identity.resend_confirmation(&email).await {
                    Ok(()) => {
                        self.notifier.notify(Notice::info(
                            "Email Sent",
                            "Confirmation email has been resent. Please check your inbox \
                             and spam folder.",
                        ));
                        Some(AuthEvent::ResendSucceeded)
                    }
                    Err(err) => {
                        let error = classify(&err);
                        warn!(error = %err, "resend confirmation failed");
                        self.notifier
                            .notify(Notice::error("Error", error.to_string()));
                        Some(AuthEvent::ResendFailed { error })
                    }
                }
            }
            AuthAction::NavigateToDashboard => {
                info!("authenticated; navigating to dashboard");
                self.navigation.go_to(Screen::Dashboard);
                None
            }
        }
    }

    fn notify_failure(&self, mode: AuthMode, error: &AuthError) {
        let notice = match error {
            AuthError::InvalidCredentials => Notice::error(
                "Invalid Credentials",
                "Please check your email and password and try again.",
            ),
            AuthError::EmailNotConfirmed => Notice::error(
                "Email Not Confirmed",
                "Please check your email and click the confirmation link, or resend the \
                 confirmation email.",
            ),
            AuthError::AccountAlreadyExists => Notice::error(
                "Account Exists",
                "An account with this email already exists. Please try logging in instead.",
            ),
            _ => match mode {
                AuthMode::Login => Notice::error("Login Failed", error.to_string()),
                AuthMode::Signup => Notice::error("Sign Up Failed", error.to_string()),
            },
        };
        self.notifier.notify(notice);
    }
}

fn classify(err: &IdentityError) -> AuthError {
    match err {
        IdentityError::Rejected { message } => AuthError::classify(message),
        IdentityError::Transport(message) => AuthError::Generic(message.clone()),
    }
}
