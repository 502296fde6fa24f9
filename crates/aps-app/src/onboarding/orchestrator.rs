//! Onboarding wizard orchestrator.
//!
//! Owns the editable draft and the wizard position for one signed-in
//! identity. Every advance persists exactly the current step's fields as
//! a merge-upsert; stepping back is draft-only.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use aps_core::onboarding::{
    resume_position, DraftField, StepDraft, StepValidationError, WizardPosition, WizardStep,
};
use aps_core::ports::{
    NavigationPort, Notice, NotifierPort, OnboardingStorePort, Screen, StoreError,
};
use aps_core::session::IdentityId;

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// Local check failed; nothing was sent to the store.
    #[error("step validation failed: {0}")]
    Validation(#[from] StepValidationError),

    /// The upsert failed; the draft is unchanged and retryable.
    #[error("saving onboarding progress failed: {0}")]
    Persistence(#[from] StoreError),
}

/// Immutable view of the wizard published on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingSnapshot {
    pub position: WizardPosition,
    pub draft: StepDraft,
    pub saving: bool,
}

struct WizardState {
    draft: StepDraft,
    position: WizardPosition,
    /// Mirror of the last persisted record's completed set; `back()`
    /// never shrinks it.
    completed_steps: BTreeSet<u8>,
}

impl WizardState {
    fn fresh() -> Self {
        Self {
            draft: StepDraft::default(),
            position: WizardPosition::Step(WizardStep::FIRST),
            completed_steps: BTreeSet::new(),
        }
    }
}

pub struct OnboardingOrchestrator {
    store: Arc<dyn OnboardingStorePort>,
    navigation: Arc<dyn NavigationPort>,
    notifier: Arc<dyn NotifierPort>,
    user_id: IdentityId,
    state: Mutex<WizardState>,
    /// Step lock: at most one upsert in flight; a second `next()` is a
    /// no-op, not queued.
    saving: AtomicBool,
    snapshot_tx: watch::Sender<OnboardingSnapshot>,
}

impl OnboardingOrchestrator {
    pub fn new(
        store: Arc<dyn OnboardingStorePort>,
        navigation: Arc<dyn NavigationPort>,
        notifier: Arc<dyn NotifierPort>,
        user_id: IdentityId,
    ) -> Self {
        let fresh = WizardState::fresh();
        let (snapshot_tx, _) = watch::channel(OnboardingSnapshot {
            position: fresh.position,
            draft: fresh.draft.clone(),
            saving: false,
        });
        Self {
            store,
            navigation,
            notifier,
            user_id,
            state: Mutex::new(fresh),
            saving: AtomicBool::new(false),
            snapshot_tx,
        }
    }

    /// Fetch-or-default: seed the draft from the stored record and derive
    /// the resume position from its completed steps. Read failures other
    /// than "no record" are reported but fail open to an empty draft.
    pub async fn load(&self) -> OnboardingSnapshot {
        match self.store.get(&self.user_id).await {
            Ok(Some(record)) => {
                let position = resume_position(&record);
                debug!(user_id = %self.user_id, ?position, "onboarding record loaded");
                {
                    let mut state = self.state.lock().await;
                    state.draft = StepDraft::seed(&record);
                    state.completed_steps = record.completed_steps.clone();
                    state.position = position;
                }
                if position == WizardPosition::Completed {
                    // Already done; the wizard is not re-entered.
                    self.navigation.go_to(Screen::Dashboard);
                }
            }
            Ok(None) => {
                debug!(user_id = %self.user_id, "no onboarding record; starting fresh");
                *self.state.lock().await = WizardState::fresh();
            }
            Err(err) => {
                warn!(error = %err, "onboarding load failed; starting from an empty draft");
                self.notifier.notify(Notice::error(
                    "Error",
                    "Could not load your saved progress. Starting from a blank form.",
                ));
                *self.state.lock().await = WizardState::fresh();
            }
        }
        self.publish().await
    }

    /// Update one field of the draft buffer.
    pub async fn set_field(&self, field: DraftField, value: String) -> OnboardingSnapshot {
        self.state.lock().await.draft.set(field, value);
        self.publish().await
    }

    /// Validate the current step and persist exactly its fields. On the
    /// last step this also sets the completion flag and hands control to
    /// the dashboard.
    pub async fn next(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        if self.saving.swap(true, Ordering::SeqCst) {
            // An upsert is already in flight.
            return Ok(self.snapshot().await);
        }
        self.publish().await;
        let result = self.advance().await;
        self.saving.store(false, Ordering::SeqCst);
        self.publish().await;
        result
    }

    /// Step back in the draft only. Persistence and `completed_steps`
    /// are untouched, so an already-completed step stays completed.
    pub async fn back(&self) -> OnboardingSnapshot {
        {
            let mut state = self.state.lock().await;
            if let WizardPosition::Step(step) = state.position {
                if let Some(prev) = step.prev() {
                    state.position = WizardPosition::Step(prev);
                }
            }
        }
        self.publish().await
    }

    pub async fn snapshot(&self) -> OnboardingSnapshot {
        let state = self.state.lock().await;
        OnboardingSnapshot {
            position: state.position,
            draft: state.draft.clone(),
            saving: self.saving.load(Ordering::SeqCst),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<OnboardingSnapshot> {
        self.snapshot_tx.subscribe()
    }

    async fn advance(&self) -> Result<OnboardingSnapshot, OnboardingError> {
        let (step, draft, completed) = {
            let state = self.state.lock().await;
            match state.position {
                WizardPosition::Step(step) => {
                    (step, state.draft.clone(), state.completed_steps.clone())
                }
                WizardPosition::Completed => return Ok(self.snapshot().await),
            }
        };

        if let Err(err) = draft.validate(step) {
            self.notifier
                .notify(Notice::error("Missing Information", err.to_string()));
            return Err(err.into());
        }

        let patch = draft.patch_for(step).with_step_advance(step.number(), &completed);
        match self.store.upsert(&self.user_id, patch).await {
            Ok(record) => {
                let finished = {
                    let mut state = self.state.lock().await;
                    state.completed_steps = record.completed_steps.clone();
                    match step.next() {
                        Some(next_step) => {
                            debug!(step = step.number(), "step persisted; advancing");
                            state.position = WizardPosition::Step(next_step);
                            false
                        }
                        None => {
                            info!("onboarding completed");
                            state.position = WizardPosition::Completed;
                            true
                        }
                    }
                };
                if finished {
                    self.notifier.notify(Notice::info(
                        "Welcome to ApplySmart!",
                        "Your profile is now complete. Let's find you the perfect job!",
                    ));
                    self.navigation.go_to(Screen::Dashboard);
                }
                Ok(self.snapshot().await)
            }
            Err(err) => {
                warn!(error = %err, step = step.number(), "onboarding upsert failed");
                self.notifier.notify(Notice::error(
                    "Error",
                    "Failed to save your information. Please try again.",
                ));
                Err(err.into())
            }
        }
    }

    async fn publish(&self) -> OnboardingSnapshot {
        let snapshot = self.snapshot().await;
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}
