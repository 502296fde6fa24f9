//! TOML configuration loading.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use aps_core::config::AppConfig;

/// Load configuration from a TOML file, falling back to defaults when the
/// file is absent. A present-but-invalid file is an error, not a silent
/// fallback.
pub async fn load_app_config(path: impl AsRef<Path>) -> Result<AppConfig> {
    let path = path.as_ref();
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "config file absent; using defaults");
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()))
        }
    };
    let config: AppConfig =
        toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(identity_url = %config.identity.base_url, "config loaded");
    Ok(config)
}
