//! Filesystem infrastructure: implements `LocalFs` and `PathResolver`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::PathResolver;
use crate::domain::SiteError;

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| filesystem(path, &e).into())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).map_err(|e| filesystem(path, &e).into())
    }

    fn remove_dir_all_if_exists(&self, path: &Path) -> Result<bool> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(filesystem(path, &e).into()),
        }
    }
}

fn filesystem(path: &Path, err: &std::io::Error) -> SiteError {
    SiteError::Filesystem {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

/// Directory layout of the data root.
///
/// ```text
/// <root>/service              shared service-site root
/// <root>/apps/<app>/live      live site root
/// <root>/apps/<app>/dev       developer site root
/// <root>/host.json            registry document
/// ```
#[derive(Debug, Clone)]
pub struct SitePaths {
    root: PathBuf,
}

impl SitePaths {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Data root from the config file, falling back to `~/.sitehost`.
    ///
    /// # Errors
    ///
    /// Returns an error if no root is configured and the home directory
    /// cannot be determined.
    pub fn from_config(root: Option<&Path>) -> Result<Self> {
        if let Some(root) = root {
            return Ok(Self::new(root.to_path_buf()));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::new(home.join(".sitehost")))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn registry_file(&self) -> PathBuf {
        self.root.join("host.json")
    }
}

impl PathResolver for SitePaths {
    fn application_root(&self, application: &str) -> PathBuf {
        self.root.join("apps").join(application)
    }

    fn live_site_root(&self, application: &str) -> PathBuf {
        self.application_root(application).join("live")
    }

    fn developer_site_root(&self, application: &str) -> PathBuf {
        self.application_root(application).join("dev")
    }

    fn service_site_root(&self) -> PathBuf {
        self.root.join("service")
    }
}
