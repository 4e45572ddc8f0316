//! Host registry model: the committed state of sites and pools, the staged
//! mutations a session accumulates, and batch application of those
//! mutations.
//!
//! A batch is applied to a copy of the snapshot and only replaces it when
//! every change succeeds, so a rejected batch leaves the snapshot untouched.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{MappedPath, ObjectState, PoolRecord, PoolSpec, SiteRecord, SiteSpec};

/// Reason a single registry mutation was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostChangeError {
    #[error("site '{0}' already exists")]
    SiteExists(String),

    #[error("site '{0}' does not exist")]
    SiteNotFound(String),

    #[error("port {port} is already bound by site '{site}'")]
    PortInUse { port: u16, site: String },

    #[error("pool '{0}' does not exist")]
    PoolNotFound(String),

    #[error("pool '{0}' already exists with a different configuration")]
    PoolConflict(String),

    #[error("path '{path}' is already mapped in site '{site}'")]
    PathMapped { site: String, path: String },

    #[error("invalid virtual path '{0}': must start with '/'")]
    InvalidPath(String),
}

/// A staged mutation of the host registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostChange {
    AddPool(PoolSpec),
    AddSite(SiteSpec),
    AddApplication {
        site: String,
        path: String,
        physical_path: PathBuf,
    },
    SetPhysicalPath {
        site: String,
        physical_path: PathBuf,
    },
    RemoveSite(String),
}

/// Committed registry state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HostSnapshot {
    #[serde(default)]
    pub sites: BTreeMap<String, SiteRecord>,
    #[serde(default)]
    pub pools: BTreeMap<String, PoolRecord>,
}

impl HostSnapshot {
    #[must_use]
    pub fn site(&self, name: &str) -> Option<&SiteRecord> {
        self.sites.get(name)
    }

    #[must_use]
    pub fn pool(&self, name: &str) -> Option<&PoolRecord> {
        self.pools.get(name)
    }

    /// Name of the site bound to `port`, if any.
    #[must_use]
    pub fn site_on_port(&self, port: u16) -> Option<&str> {
        self.sites
            .values()
            .find(|s| s.port == port)
            .map(|s| s.name.as_str())
    }

    /// Apply a batch of changes, returning the resulting snapshot.
    ///
    /// `self` is never modified; on error the first rejected change is
    /// reported.
    pub fn apply_all(&self, changes: &[HostChange]) -> Result<HostSnapshot, HostChangeError> {
        let mut next = self.clone();
        for change in changes {
            next.apply(change)?;
        }
        Ok(next)
    }

    /// Apply one change in place.
    pub fn apply(&mut self, change: &HostChange) -> Result<(), HostChangeError> {
        match change {
            HostChange::AddPool(spec) => self.add_pool(spec),
            HostChange::AddSite(spec) => self.add_site(spec),
            HostChange::AddApplication {
                site,
                path,
                physical_path,
            } => self.add_application(site, path, physical_path),
            HostChange::SetPhysicalPath {
                site,
                physical_path,
            } => {
                let record = self
                    .sites
                    .get_mut(site)
                    .ok_or_else(|| HostChangeError::SiteNotFound(site.clone()))?;
                record.physical_path.clone_from(physical_path);
                Ok(())
            }
            HostChange::RemoveSite(name) => self
                .sites
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| HostChangeError::SiteNotFound(name.clone())),
        }
    }

    fn add_pool(&mut self, spec: &PoolSpec) -> Result<(), HostChangeError> {
        if let Some(existing) = self.pools.get(&spec.name) {
            // Re-adding an identical pool is a no-op so that two callers
            // racing on pool creation converge on the same record.
            if existing.spec == *spec {
                return Ok(());
            }
            return Err(HostChangeError::PoolConflict(spec.name.clone()));
        }
        let state = if spec.auto_start {
            ObjectState::Started
        } else {
            ObjectState::Stopped
        };
        self.pools.insert(
            spec.name.clone(),
            PoolRecord {
                spec: spec.clone(),
                state,
            },
        );
        Ok(())
    }

    fn add_site(&mut self, spec: &SiteSpec) -> Result<(), HostChangeError> {
        if self.sites.contains_key(&spec.name) {
            return Err(HostChangeError::SiteExists(spec.name.clone()));
        }
        if let Some(site) = self.site_on_port(spec.port) {
            return Err(HostChangeError::PortInUse {
                port: spec.port,
                site: site.to_string(),
            });
        }
        let pool = self
            .pools
            .get(&spec.pool)
            .ok_or_else(|| HostChangeError::PoolNotFound(spec.pool.clone()))?;
        let state = if pool.state == ObjectState::Started {
            ObjectState::Started
        } else {
            ObjectState::Stopped
        };
        self.sites.insert(
            spec.name.clone(),
            SiteRecord {
                name: spec.name.clone(),
                port: spec.port,
                physical_path: spec.physical_path.clone(),
                pool: spec.pool.clone(),
                state,
                applications: Vec::new(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn add_application(
        &mut self,
        site: &str,
        path: &str,
        physical_path: &std::path::Path,
    ) -> Result<(), HostChangeError> {
        if !path.starts_with('/') {
            return Err(HostChangeError::InvalidPath(path.to_string()));
        }
        let record = self
            .sites
            .get_mut(site)
            .ok_or_else(|| HostChangeError::SiteNotFound(site.to_string()))?;
        if record.application(path).is_some() {
            return Err(HostChangeError::PathMapped {
                site: site.to_string(),
                path: path.to_string(),
            });
        }
        record.applications.push(MappedPath {
            path: path.to_string(),
            physical_path: physical_path.to_path_buf(),
        });
        Ok(())
    }
}

/// A session's view of the host: the committed snapshot it was opened on,
/// the changes staged since, and the snapshot those changes produce.
///
/// Lookups go through [`HostView::snapshot`], so a site staged in this
/// session is visible (and its port reserved) before it is committed.
#[derive(Debug, Clone, Default)]
pub struct HostView {
    committed: HostSnapshot,
    staged: HostSnapshot,
    pending: Vec<HostChange>,
}

impl HostView {
    #[must_use]
    pub fn new(committed: HostSnapshot) -> Self {
        Self {
            staged: committed.clone(),
            committed,
            pending: Vec::new(),
        }
    }

    /// The committed snapshot with this session's staged changes applied.
    #[must_use]
    pub fn snapshot(&self) -> &HostSnapshot {
        &self.staged
    }

    #[must_use]
    pub fn committed(&self) -> &HostSnapshot {
        &self.committed
    }

    #[must_use]
    pub fn pending(&self) -> &[HostChange] {
        &self.pending
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Stage a change. It is validated against the current view immediately
    /// and rejected without being recorded if it does not apply.
    pub fn stage(&mut self, change: HostChange) -> Result<(), HostChangeError> {
        self.staged.apply(&change)?;
        self.pending.push(change);
        Ok(())
    }

    /// Replace the committed base (e.g. after re-reading the host) and
    /// replay the staged changes on top of it.
    pub fn rebase(&mut self, committed: HostSnapshot) -> Result<(), HostChangeError> {
        let staged = committed.apply_all(&self.pending)?;
        self.committed = committed;
        self.staged = staged;
        Ok(())
    }

    /// Record that the staged changes were committed, producing `committed`.
    pub fn mark_committed(&mut self, committed: HostSnapshot) {
        self.staged = committed.clone();
        self.committed = committed;
        self.pending.clear();
    }

    /// Mutate the committed base and the staged view in the same way, for
    /// host operations that take effect immediately (start/stop).
    pub fn update_both(&mut self, mut f: impl FnMut(&mut HostSnapshot)) {
        f(&mut self.committed);
        f(&mut self.staged);
    }
}
