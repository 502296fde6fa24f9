//! Shared auth flow context.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use aps_core::auth::{AuthSnapshot, AuthState};

/// State cell shared between the orchestrator and its session watcher.
///
/// ## Lock Ordering
/// `dispatch_lock` serializes the whole transition + action run; `state`
/// is held only for the read or write itself. When both are needed,
/// acquire `dispatch_lock` first.
pub struct AuthContext {
    state: Arc<Mutex<AuthState>>,
    dispatch_lock: Arc<Mutex<()>>,
    snapshot_tx: watch::Sender<AuthSnapshot>,
}

impl AuthContext {
    pub fn new(initial_state: AuthState) -> Self {
        let (snapshot_tx, _) = watch::channel(AuthSnapshot::new(initial_state.clone(), None));
        Self {
            state: Arc::new(Mutex::new(initial_state)),
            dispatch_lock: Arc::new(Mutex::new(())),
            snapshot_tx,
        }
    }

    pub async fn get_state(&self) -> AuthState {
        self.state.lock().await.clone()
    }

    pub async fn acquire_dispatch_lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.dispatch_lock.lock().await
    }

    /// Only called while holding the dispatch lock.
    pub async fn set_state(&self, state: AuthState) {
        let mut guard = self.state.lock().await;
        *guard = state;
    }

    /// Publish a snapshot to all subscribers.
    pub fn publish(&self, snapshot: AuthSnapshot) {
        self.snapshot_tx.send_replace(snapshot);
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot_tx.subscribe()
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new(AuthState::initial())
    }
}
