//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use thiserror::Error;

// ── Site errors ───────────────────────────────────────────────────────────────

/// Errors raised while provisioning or tearing down sites.
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Invalid application name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// The host is in a state the orchestrator does not expect (missing or
    /// conflicting site/pool).
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No free port in {min}-{max} after {attempts} attempts")]
    ResourceExhausted { min: u16, max: u16, attempts: u32 },

    #[error("Host operation '{operation}' failed: {reason}")]
    HostOperationFailed { operation: String, reason: String },

    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: String, reason: String },

    /// The shared host is left in a degraded state.
    #[error("Fatal: {0}")]
    Fatal(String),
}

impl SiteError {
    pub fn host(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::HostOperationFailed {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Short machine-readable code used by `--json` error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SiteError::InvalidName { .. } => "INVALID_NAME",
            SiteError::Configuration(_) => "CONFIGURATION",
            SiteError::ResourceExhausted { .. } => "RESOURCE_EXHAUSTED",
            SiteError::HostOperationFailed { .. } => "HOST_OPERATION_FAILED",
            SiteError::Filesystem { .. } => "FILESYSTEM",
            SiteError::Fatal(_) => "FATAL",
        }
    }
}

/// Orchestration step an error was raised in. Attached to errors as
/// `anyhow` context so callers can recover it with `downcast_ref::<Stage>()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EnsurePool,
    ServiceSite,
    LiveSite,
    PathMapping,
    Commit,
    Settle,
    DeveloperSite,
    WebRoot,
    RemoveSites,
    DeleteFiles,
    RestartPool,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::EnsurePool => "ensure-pool",
            Stage::ServiceSite => "service-site",
            Stage::LiveSite => "live-site",
            Stage::PathMapping => "path-mapping",
            Stage::Commit => "commit",
            Stage::Settle => "settle",
            Stage::DeveloperSite => "developer-site",
            Stage::WebRoot => "web-root",
            Stage::RemoveSites => "remove-sites",
            Stage::DeleteFiles => "delete-files",
            Stage::RestartPool => "restart-pool",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.as_str())
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
