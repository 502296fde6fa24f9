//! UI-facing adapters.
//!
//! The control layer only knows the navigation and notifier ports; the
//! shell decides how screen changes and notices reach the user. These two
//! adapters cover the headless case: navigation over a channel the shell
//! drains, notices onto the tracing pipeline.

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use aps_core::ports::{NavigationPort, Notice, NotifierPort, Screen, Severity};

const NAVIGATION_CAPACITY: usize = 8;

/// Forwards navigation requests to whoever holds the receiver.
pub struct ChannelNavigator {
    tx: mpsc::Sender<Screen>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::Receiver<Screen>) {
        let (tx, rx) = mpsc::channel(NAVIGATION_CAPACITY);
        (Self { tx }, rx)
    }
}

impl NavigationPort for ChannelNavigator {
    fn go_to(&self, screen: Screen) {
        if self.tx.try_send(screen).is_err() {
            warn!(?screen, "navigation receiver gone; request dropped");
        }
    }
}

/// Emits notices as structured log events.
pub struct TracingNotifier;

impl NotifierPort for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => info!(title = %notice.title, "{}", notice.body),
            Severity::Error => error!(title = %notice.title, "{}", notice.body),
        }
    }
}
