//! # aps-infra
//!
//! Infrastructure adapters behind the `aps-core` ports: the HTTP identity
//! provider, the file-backed onboarding store, the config loader, and the
//! default navigation/notifier implementations.

pub mod config;
pub mod file_store;
pub mod http_identity;
pub mod ui;

pub use config::load_app_config;
pub use file_store::FileOnboardingStore;
pub use http_identity::HttpIdentityProvider;
pub use ui::{ChannelNavigator, TracingNotifier};
