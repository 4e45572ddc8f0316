//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::{SitehostConfig, apply_config_value};

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<SitehostConfig> {
    store.load()
}

/// Save configuration.
pub fn save_config(store: &impl ConfigStore, config: &SitehostConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist a single `key = value` setting.
///
/// Returns the updated configuration. Nothing is written when validation
/// fails.
///
/// # Errors
///
/// Returns an error if the key is unknown, the value is invalid, or the
/// store cannot be read or written.
pub fn set_config_value(
    store: &impl ConfigStore,
    key: &str,
    value: &str,
) -> Result<SitehostConfig> {
    let mut config = store.load()?;
    apply_config_value(&mut config, key, value)?;
    store.save(&config)?;
    tracing::info!(key, value, "configuration updated");
    Ok(config)
}
