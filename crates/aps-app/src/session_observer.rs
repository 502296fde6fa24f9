//! Process-wide session cell.
//!
//! Single writer (the forwarding task fed by the identity provider's
//! stream), many readers. Explicit start and shutdown; both orchestrators
//! subscribe, neither writes.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

use aps_core::ports::IdentityPort;
use aps_core::session::{AuthSession, SessionChange};

pub struct SessionObserver {
    cell: watch::Sender<Option<AuthSession>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionObserver {
    /// Subscribe to the provider's session stream and start forwarding
    /// into the cell.
    pub async fn start(identity: Arc<dyn IdentityPort>) -> anyhow::Result<Arc<Self>> {
        let mut events = identity.session_events().await?;
        let (cell, _keepalive) = watch::channel(None);
        let feed = cell.clone();

        let task = tokio::spawn(async move {
            while let Some(change) = events.recv().await {
                let value = match change {
                    SessionChange::SignedIn(session) => Some(session),
                    SessionChange::SignedOut => None,
                };
                debug!(signed_in = value.is_some(), "session change observed");
                feed.send_replace(value);
            }
            debug!("session stream closed");
        });

        Ok(Arc::new(Self {
            cell,
            task: Mutex::new(Some(task)),
        }))
    }

    /// Current session, if any.
    pub fn current(&self) -> Option<AuthSession> {
        self.cell.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Watch handle for reacting to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.cell.subscribe()
    }

    /// Stop forwarding. Late stream items are discarded, not applied.
    pub async fn shutdown(&self) {
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
    }
}
