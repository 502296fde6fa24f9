//! Navigation port.
//!
//! Fire-and-forget screen transitions; routing itself lives in the shell.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Home,
    Auth,
    Dashboard,
    Onboarding,
}

pub trait NavigationPort: Send + Sync {
    fn go_to(&self, screen: Screen);
}
