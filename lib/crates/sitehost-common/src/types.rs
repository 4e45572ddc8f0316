use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role a site plays for its application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SiteRole {
    Live,
    Dev,
    Service,
}

impl SiteRole {
    pub const ALL: [SiteRole; 3] = [SiteRole::Service, SiteRole::Live, SiteRole::Dev];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SiteRole::Live => "live",
            SiteRole::Dev => "dev",
            SiteRole::Service => "service",
        }
    }
}

impl fmt::Display for SiteRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state reported by the host for a site or a pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObjectState {
    Starting,
    Started,
    Stopping,
    #[default]
    Stopped,
    Unknown,
}

impl fmt::Display for ObjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectState::Starting => "starting",
            ObjectState::Started => "started",
            ObjectState::Stopping => "stopping",
            ObjectState::Stopped => "stopped",
            ObjectState::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Request pipeline mode of an execution pool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    Integrated,
    Classic,
}

/// Configuration an execution pool is created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolSpec {
    pub name: String,
    pub runtime_version: String,
    pub pipeline_mode: PipelineMode,
    pub enable_32bit: bool,
    pub auto_start: bool,
}

impl PoolSpec {
    /// Name of the pool every site on the host binds to.
    pub const SHARED_NAME: &'static str = "sitehost";

    /// The fixed configuration of the shared pool.
    #[must_use]
    pub fn shared() -> Self {
        Self {
            name: Self::SHARED_NAME.to_string(),
            runtime_version: "v4.0".to_string(),
            pipeline_mode: PipelineMode::Integrated,
            enable_32bit: true,
            auto_start: true,
        }
    }
}

/// An execution pool as registered with the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PoolRecord {
    #[serde(flatten)]
    pub spec: PoolSpec,
    pub state: ObjectState,
}

impl PoolRecord {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// Parameters for registering a new site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSpec {
    pub name: String,
    pub physical_path: PathBuf,
    pub port: u16,
    pub pool: String,
}

/// A sub-application mapped under a site, pointing at another directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappedPath {
    /// Virtual path inside the site, always starting with `/`.
    pub path: String,
    pub physical_path: PathBuf,
}

/// A site as registered with the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteRecord {
    pub name: String,
    pub port: u16,
    /// Physical path of the root virtual directory.
    pub physical_path: PathBuf,
    pub pool: String,
    pub state: ObjectState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<MappedPath>,
    pub created_at: DateTime<Utc>,
}

impl SiteRecord {
    /// Look up a mapped sub-application by its virtual path.
    #[must_use]
    pub fn application(&self, path: &str) -> Option<&MappedPath> {
        self.applications.iter().find(|a| a.path == path)
    }
}

/// Externally reachable URLs returned after an application is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteUrls {
    pub service_url: String,
    pub site_url: String,
}

/// One registered site of an application, as shown by `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteSummary {
    pub role: SiteRole,
    pub name: String,
    pub port: u16,
    pub url: String,
    pub physical_path: PathBuf,
    pub state: ObjectState,
}

/// Everything the host knows about one application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationStatus {
    pub application: String,
    pub sites: Vec<SiteSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<PoolRecord>,
}

impl ApplicationStatus {
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.sites.is_empty()
    }
}
