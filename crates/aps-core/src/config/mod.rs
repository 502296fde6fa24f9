//! Application configuration domain model

use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Only what the control layer needs: where the identity provider lives
/// and where local data is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identity provider settings
    pub identity: IdentityConfig,

    /// Storage settings
    pub storage: StorageConfig,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity service
    pub base_url: String,

    /// Publishable API key sent with every request
    pub anon_key: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for locally persisted records
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            identity: IdentityConfig {
                base_url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
            },
            storage: StorageConfig {
                data_dir: ".applysmart".to_string(),
            },
        }
    }
}
