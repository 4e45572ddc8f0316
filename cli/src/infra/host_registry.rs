//! Infrastructure implementation of the `HostManager` port.
//!
//! `FileHostRegistry` keeps the host's sites and pools in a JSON document.
//! Commits re-read the document, apply the session's staged batch to it and
//! write the result atomically (temp file + rename), so a rejected batch
//! leaves the document untouched. Every read-modify-write holds an exclusive
//! advisory lock on `<document>.lock`, so commits from concurrent `sitehost`
//! processes are serialized and validated against each other.

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitehost_common::{
    HostChange, HostChangeError, HostSnapshot, HostView, ObjectState, PoolRecord, PoolSpec,
    SiteRecord, SiteSpec,
};

use crate::application::ports::{HostManager, HostSession};
use crate::domain::SiteError;

/// Registry document on disk, implements `HostManager` for the infra layer.
#[derive(Debug, Clone)]
pub struct FileHostRegistry {
    path: PathBuf,
}

impl FileHostRegistry {
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostManager for FileHostRegistry {
    type Session = FileHostSession;

    async fn open(&self) -> Result<FileHostSession> {
        let snapshot = load_async(self.path.clone()).await?;
        Ok(FileHostSession {
            path: self.path.clone(),
            view: HostView::new(snapshot),
        })
    }
}

/// One session on the registry document.
#[derive(Debug)]
pub struct FileHostSession {
    path: PathBuf,
    view: HostView,
}

impl FileHostSession {
    fn stage(&mut self, operation: &'static str, change: HostChange) -> Result<()> {
        self.view
            .stage(change)
            .map_err(|e| rejected(operation, &e).into())
    }

    /// Load, mutate and save the document right away, then rebase this
    /// session's view on the saved document.
    async fn update_now(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut HostSnapshot) -> Result<(), HostChangeError> + Send + 'static,
    ) -> Result<()> {
        let path = self.path.clone();
        let saved = tokio::task::spawn_blocking(move || {
            let _lock = lock_document(&path)?;
            let mut snapshot = load_sync(&path)?;
            f(&mut snapshot).map_err(|e| rejected(operation, &e))?;
            save_sync(&path, &snapshot)?;
            Ok::<HostSnapshot, anyhow::Error>(snapshot)
        })
        .await
        .context("registry update task panicked")??;

        self.view
            .rebase(saved)
            .map_err(|e| rejected(operation, &e).into())
    }
}

impl HostSession for FileHostSession {
    fn site(&self, name: &str) -> Option<SiteRecord> {
        self.view.snapshot().site(name).cloned()
    }

    fn sites(&self) -> Vec<SiteRecord> {
        self.view.snapshot().sites.values().cloned().collect()
    }

    fn pool(&self, name: &str) -> Option<PoolRecord> {
        self.view.snapshot().pool(name).cloned()
    }

    fn add_site(&mut self, spec: SiteSpec) -> Result<()> {
        self.stage("add site", HostChange::AddSite(spec))
    }

    fn add_application(&mut self, site: &str, path: &str, physical_path: &Path) -> Result<()> {
        self.stage(
            "add application",
            HostChange::AddApplication {
                site: site.to_string(),
                path: path.to_string(),
                physical_path: physical_path.to_path_buf(),
            },
        )
    }

    fn set_physical_path(&mut self, site: &str, physical_path: &Path) -> Result<()> {
        self.stage(
            "set physical path",
            HostChange::SetPhysicalPath {
                site: site.to_string(),
                physical_path: physical_path.to_path_buf(),
            },
        )
    }

    fn remove_site(&mut self, name: &str) -> Result<()> {
        self.stage("remove site", HostChange::RemoveSite(name.to_string()))
    }

    fn add_pool(&mut self, spec: &PoolSpec) -> Result<()> {
        self.stage("add pool", HostChange::AddPool(spec.clone()))
    }

    async fn commit(&mut self) -> Result<()> {
        if !self.view.has_pending() {
            return Ok(());
        }
        let path = self.path.clone();
        let pending = self.view.pending().to_vec();
        let committed = tokio::task::spawn_blocking(move || {
            let _lock = lock_document(&path)?;
            let current = load_sync(&path)?;
            let next = current
                .apply_all(&pending)
                .map_err(|e| rejected("commit", &e))?;
            save_sync(&path, &next)?;
            Ok::<HostSnapshot, anyhow::Error>(next)
        })
        .await
        .context("registry commit task panicked")??;

        tracing::debug!(
            path = %self.path.display(),
            changes = self.view.pending().len(),
            "registry batch committed"
        );
        self.view.mark_committed(committed);
        Ok(())
    }

    async fn refresh(&mut self) -> Result<()> {
        let snapshot = load_async(self.path.clone()).await?;
        self.view
            .rebase(snapshot)
            .map_err(|e| rejected("refresh", &e).into())
    }

    async fn stop_site(&mut self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.update_now("stop site", move |snapshot| {
            let site = snapshot
                .sites
                .get_mut(&name)
                .ok_or_else(|| HostChangeError::SiteNotFound(name.clone()))?;
            site.state = ObjectState::Stopped;
            Ok(())
        })
        .await
    }

    async fn start_pool(&mut self, name: &str) -> Result<()> {
        set_pool_state(self, "start pool", name, ObjectState::Started).await
    }

    async fn stop_pool(&mut self, name: &str) -> Result<()> {
        set_pool_state(self, "stop pool", name, ObjectState::Stopped).await
    }
}

async fn set_pool_state(
    session: &mut FileHostSession,
    operation: &'static str,
    name: &str,
    state: ObjectState,
) -> Result<()> {
    let name = name.to_string();
    session
        .update_now(operation, move |snapshot| {
            let pool = snapshot
                .pools
                .get_mut(&name)
                .ok_or_else(|| HostChangeError::PoolNotFound(name.clone()))?;
            pool.state = state;
            Ok(())
        })
        .await
}

fn rejected(operation: &'static str, err: &HostChangeError) -> SiteError {
    SiteError::host(operation, err.to_string())
}

// ── Document I/O ─────────────────────────────────────────────────────────────

async fn load_async(path: PathBuf) -> Result<HostSnapshot> {
    tokio::task::spawn_blocking(move || load_sync(&path))
        .await
        .context("registry load task panicked")?
}

/// Block until this handle holds the exclusive lock guarding `path`.
/// Released when the returned file is dropped.
fn lock_document(path: &Path) -> Result<File> {
    let mut lock_name = path.file_name().unwrap_or_default().to_os_string();
    lock_name.push(".lock");
    let lock_path = path.with_file_name(lock_name);
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("opening lock file {}", lock_path.display()))?;
    fs2::FileExt::lock_exclusive(&file)
        .with_context(|| format!("locking {}", lock_path.display()))?;
    Ok(file)
}

/// A missing document is an empty host.
fn load_sync(path: &Path) -> Result<HostSnapshot> {
    if !path.exists() {
        return Ok(HostSnapshot::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading registry {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing registry {}", path.display()))
}

fn save_sync(path: &Path, snapshot: &HostSnapshot) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)
        .with_context(|| format!("creating directory {}", parent.display()))?;
    let content = serde_json::to_string_pretty(snapshot).context("serializing registry")?;

    // Same directory as the target so the rename stays on one filesystem.
    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    temp.write_all(content.as_bytes())
        .context("writing registry temp file")?;
    temp.persist(path)
        .with_context(|| format!("finalizing registry {}", path.display()))?;
    Ok(())
}
