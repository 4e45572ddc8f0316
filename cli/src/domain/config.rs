//! Domain types and validators for sitehost configuration.
//!
//! Pure functions only, no I/O, no async, no filesystem access.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "sites.root",
    "ports.min",
    "ports.max",
    "ports.max_attempts",
    "timeouts.pool_state_secs",
    "timeouts.settle_secs",
    "timeouts.poll_interval_ms",
];

/// Lowest port handed out to sites (first port above the well-known range).
pub const MIN_PORT: u16 = 1025;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.sitehost/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SitehostConfig {
    /// Data root settings.
    pub sites: SitesConfig,
    /// Port allocation settings.
    pub ports: PortsConfig,
    /// Upper bounds for host state transitions.
    pub timeouts: TimeoutsConfig,
}

/// Where application directories and the local registry live.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SitesConfig {
    /// Data root. `None` means `~/.sitehost`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Port range sites are allocated from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortsConfig {
    pub min: u16,
    pub max: u16,
    /// Random candidates tried before giving up.
    pub max_attempts: u32,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            min: MIN_PORT,
            max: u16::MAX,
            max_attempts: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutsConfig {
    /// Pool start/stop transitions.
    pub pool_state_secs: u64,
    /// Newly committed sites reaching `started`.
    pub settle_secs: u64,
    /// Delay between two host state polls.
    pub poll_interval_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            pool_state_secs: 60,
            settle_secs: 30,
            poll_interval_ms: 200,
        }
    }
}

// ── Orchestrator settings ────────────────────────────────────────────────────

/// Inclusive port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub min: u16,
    pub max: u16,
}

impl PortRange {
    #[must_use]
    pub fn contains(&self, port: u16) -> bool {
        (self.min..=self.max).contains(&port)
    }
}

/// Values the orchestration services need, resolved from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub ports: PortRange,
    pub max_port_attempts: u32,
    pub pool_state_timeout: Duration,
    pub settle_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self::from(&SitehostConfig::default())
    }
}

impl From<&SitehostConfig> for SiteSettings {
    fn from(config: &SitehostConfig) -> Self {
        Self {
            ports: PortRange {
                min: config.ports.min,
                max: config.ports.max,
            },
            max_port_attempts: config.ports.max_attempts,
            pool_state_timeout: Duration::from_secs(config.timeouts.pool_state_secs),
            settle_timeout: Duration::from_secs(config.timeouts.settle_secs),
            poll_interval: Duration::from_millis(config.timeouts.poll_interval_ms),
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |expected: &str| -> anyhow::Error {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
        .into()
    };
    match key {
        "sites.root" => {
            if value.trim().is_empty() {
                return Err(invalid("Expected a non-empty path"));
            }
        }
        "ports.min" | "ports.max" => match value.parse::<u16>() {
            Ok(port) if port >= MIN_PORT => {}
            _ => return Err(invalid("Expected a port between 1025 and 65535")),
        },
        "ports.max_attempts" => match value.parse::<u32>() {
            Ok(n) if n >= 1 => {}
            _ => return Err(invalid("Expected a positive integer")),
        },
        "timeouts.pool_state_secs" | "timeouts.settle_secs" | "timeouts.poll_interval_ms" => {
            match value.parse::<u64>() {
                Ok(n) if n >= 1 => {}
                _ => return Err(invalid("Expected a positive integer")),
            }
        }
        _ => {}
    }
    Ok(())
}

/// Apply a validated `key = value` to `config`.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or if the change would
/// leave `ports.min` above `ports.max`. `config` is unchanged on error.
pub fn apply_config_value(config: &mut SitehostConfig, key: &str, value: &str) -> Result<()> {
    validate_config_key(key)?;
    validate_config_value(key, value)?;
    let mut next = config.clone();
    match key {
        "sites.root" => next.sites.root = Some(PathBuf::from(value)),
        "ports.min" => next.ports.min = value.parse()?,
        "ports.max" => next.ports.max = value.parse()?,
        "ports.max_attempts" => next.ports.max_attempts = value.parse()?,
        "timeouts.pool_state_secs" => next.timeouts.pool_state_secs = value.parse()?,
        "timeouts.settle_secs" => next.timeouts.settle_secs = value.parse()?,
        "timeouts.poll_interval_ms" => next.timeouts.poll_interval_ms = value.parse()?,
        _ => anyhow::bail!("Unknown setting: {key}"),
    }
    check_port_order(&next, key, value)?;
    *config = next;
    Ok(())
}

/// Validate a whole configuration, as loaded from disk, with the same rules
/// `config set` applies to single values.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for the first offending setting.
pub fn validate_config(config: &SitehostConfig) -> Result<()> {
    if let Some(root) = &config.sites.root {
        validate_config_value("sites.root", &root.to_string_lossy())?;
    }
    let numeric = [
        ("ports.min", u64::from(config.ports.min)),
        ("ports.max", u64::from(config.ports.max)),
        ("ports.max_attempts", u64::from(config.ports.max_attempts)),
        ("timeouts.pool_state_secs", config.timeouts.pool_state_secs),
        ("timeouts.settle_secs", config.timeouts.settle_secs),
        ("timeouts.poll_interval_ms", config.timeouts.poll_interval_ms),
    ];
    for (key, value) in numeric {
        validate_config_value(key, &value.to_string())?;
    }
    check_port_order(config, "ports.min", &config.ports.min.to_string())
}

fn check_port_order(config: &SitehostConfig, key: &str, value: &str) -> Result<()> {
    if config.ports.min > config.ports.max {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: format!(
                "ports.min ({}) must not exceed ports.max ({})",
                config.ports.min, config.ports.max
            ),
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
