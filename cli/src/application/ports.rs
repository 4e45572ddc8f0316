//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and the shared types crate,
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use sitehost_common::{PoolRecord, PoolSpec, SiteRecord, SiteSpec};

use crate::domain::SitehostConfig;

// ── Host Management Ports ─────────────────────────────────────────────────────

/// Entry point to the host's site/pool management context.
#[allow(async_fn_in_trait)]
pub trait HostManager {
    type Session: HostSession;

    /// Open a fresh session on the current committed host state.
    async fn open(&self) -> Result<Self::Session>;
}

/// One handle on the host management context.
///
/// Lookups reflect committed state plus changes staged in this session.
/// `add_*`, `set_physical_path` and `remove_site` are staged and only take
/// effect on [`HostSession::commit`], which applies or rejects the whole
/// batch. `stop_site`, `start_pool` and `stop_pool` act on the host
/// immediately.
#[allow(async_fn_in_trait)]
pub trait HostSession {
    /// Look up a site by name.
    fn site(&self, name: &str) -> Option<SiteRecord>;
    /// All sites, including staged ones.
    fn sites(&self) -> Vec<SiteRecord>;
    /// Look up an execution pool by name.
    fn pool(&self, name: &str) -> Option<PoolRecord>;

    /// Stage a new site bound to `spec.port`.
    fn add_site(&mut self, spec: SiteSpec) -> Result<()>;
    /// Stage a sub-application `path` under `site` pointing at `physical_path`.
    fn add_application(&mut self, site: &str, path: &str, physical_path: &Path) -> Result<()>;
    /// Stage a new physical path for the root virtual directory of `site`.
    fn set_physical_path(&mut self, site: &str, physical_path: &Path) -> Result<()>;
    /// Stage removal of `site`.
    fn remove_site(&mut self, name: &str) -> Result<()>;
    /// Stage creation of an execution pool.
    fn add_pool(&mut self, spec: &PoolSpec) -> Result<()>;

    /// Apply all staged changes as one batch.
    async fn commit(&mut self) -> Result<()>;
    /// Re-read host state, keeping staged changes on top of it.
    async fn refresh(&mut self) -> Result<()>;

    /// Stop a site and wait until the host reports it stopped.
    async fn stop_site(&mut self, name: &str) -> Result<()>;
    /// Request that a pool starts. Completion is observed via `refresh`.
    async fn start_pool(&mut self, name: &str) -> Result<()>;
    /// Request that a pool stops. Completion is observed via `refresh`.
    async fn stop_pool(&mut self, name: &str) -> Result<()>;
}

// ── Network Probe Port ────────────────────────────────────────────────────────

/// Abstracts the OS listener table so port allocation can be tested without
/// binding real sockets.
#[allow(async_fn_in_trait)]
pub trait ListenerProbe {
    /// Whether a TCP listener on this machine currently holds `port`.
    async fn is_port_in_use(&self, port: u16) -> Result<bool>;
}

// ── Filesystem and Path Ports ─────────────────────────────────────────────────

/// Filesystem locations of an application's sites. Pure functions.
pub trait PathResolver {
    /// Outer directory holding everything of one application.
    fn application_root(&self, application: &str) -> PathBuf;
    /// Root of the live site (contains the web root).
    fn live_site_root(&self, application: &str) -> PathBuf;
    /// Root of the developer site (contains the web root).
    fn developer_site_root(&self, application: &str) -> PathBuf;
    /// Shared root every service site is bound to.
    fn service_site_root(&self) -> PathBuf;
}

/// Abstracts raw filesystem operations.
pub trait LocalFs {
    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;
    /// Create a directory and all its parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Write a text file, replacing any existing content.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Recursively delete a directory. Returns `false` if it did not exist.
    fn remove_dir_all_if_exists(&self, path: &Path) -> Result<bool>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts loading and saving the configuration file.
pub trait ConfigStore {
    /// Load configuration, returning defaults if no file exists.
    fn load(&self) -> Result<SitehostConfig>;
    /// Persist configuration.
    fn save(&self, config: &SitehostConfig) -> Result<()>;
    /// Location of the configuration file.
    fn path(&self) -> Result<PathBuf>;
}
