//! Tests for `config_service` against an in-memory store.

#![allow(clippy::expect_used)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

use anyhow::Result;
use sitehost_cli::application::ports::ConfigStore;
use sitehost_cli::application::services::config_service::{
    load_config, save_config, set_config_value,
};
use sitehost_cli::domain::{ConfigError, SiteSettings, SitehostConfig};

#[derive(Default)]
struct MemoryStore {
    config: RefCell<SitehostConfig>,
    saves: Cell<usize>,
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<SitehostConfig> {
        Ok(self.config.borrow().clone())
    }

    fn save(&self, config: &SitehostConfig) -> Result<()> {
        *self.config.borrow_mut() = config.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/memory/config.yaml"))
    }
}

#[test]
fn set_value_is_persisted() {
    let store = MemoryStore::default();

    let updated = set_config_value(&store, "ports.min", "30000").expect("set");

    assert_eq!(updated.ports.min, 30_000);
    assert_eq!(load_config(&store).expect("load").ports.min, 30_000);
    assert_eq!(store.saves.get(), 1);
}

#[test]
fn root_and_timeouts_flow_into_settings() {
    let store = MemoryStore::default();
    set_config_value(&store, "sites.root", "/srv/sites").expect("root");
    set_config_value(&store, "timeouts.settle_secs", "5").expect("settle");

    let config = load_config(&store).expect("load");
    let settings = SiteSettings::from(&config);

    assert_eq!(config.sites.root, Some(PathBuf::from("/srv/sites")));
    assert_eq!(settings.settle_timeout.as_secs(), 5);
}

#[test]
fn unknown_key_is_not_saved() {
    let store = MemoryStore::default();

    let err = set_config_value(&store, "ports.lowest", "3000").expect_err("unknown key");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownKey { .. })
    ));
    assert_eq!(store.saves.get(), 0);
}

#[test]
fn inverted_range_is_not_saved() {
    let store = MemoryStore::default();
    set_config_value(&store, "ports.max", "40000").expect("max");

    let err = set_config_value(&store, "ports.min", "50000").expect_err("min above max");

    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(store.saves.get(), 1);
    assert_eq!(load_config(&store).expect("load").ports.min, 1025);
}

#[test]
fn save_replaces_the_whole_document() {
    let store = MemoryStore::default();
    let mut config = SitehostConfig::default();
    config.ports.max_attempts = 12;

    save_config(&store, &config).expect("save");

    assert_eq!(load_config(&store).expect("load"), config);
}
