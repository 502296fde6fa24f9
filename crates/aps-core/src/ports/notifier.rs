//! User notification port.
//!
//! Every surfaced error and transient confirmation goes through here;
//! rendering (toast, log line, ...) is the implementation's concern.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Info,
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Error,
        }
    }
}

pub trait NotifierPort: Send + Sync {
    fn notify(&self, notice: Notice);
}
