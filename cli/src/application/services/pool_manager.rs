//! Shared execution pool: creation, and bounded start/stop transitions.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;
use sitehost_common::{ObjectState, PoolRecord, PoolSpec};
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::application::ports::HostSession;
use crate::domain::{SiteError, SiteSettings};

/// Handle to the one execution pool every site binds to.
///
/// Owns the process-wide lock that serializes every mutation of the host
/// (pool creation, site registration, teardown). Orchestration calls hold
/// the guard for their whole duration.
#[derive(Debug)]
pub struct PoolHandle {
    spec: PoolSpec,
    lock: Mutex<()>,
}

impl PoolHandle {
    #[must_use]
    pub fn new(spec: PoolSpec) -> Self {
        Self {
            spec,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    #[must_use]
    pub fn spec(&self) -> &PoolSpec {
        &self.spec
    }

    /// Acquire the host mutation lock.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Default for PoolHandle {
    fn default() -> Self {
        Self::new(PoolSpec::shared())
    }
}

/// Make sure the shared pool exists and is started.
///
/// When the pool is missing it is created with its fixed configuration and
/// committed on its own (committing anything already staged in `session`
/// with it). A pool that exists but is not started is started. Calling this
/// again is a no-op returning the existing record.
///
/// # Errors
///
/// Returns an error if the host rejects the creation, or `Fatal` if the
/// pool does not reach `started` within `pool_state_timeout`.
pub async fn ensure_pool(
    session: &mut impl HostSession,
    pool: &PoolHandle,
    settings: &SiteSettings,
) -> Result<PoolRecord> {
    if let Some(existing) = session.pool(pool.name()) {
        if existing.spec != *pool.spec() {
            tracing::warn!(
                pool = pool.name(),
                "shared pool configuration differs from the expected one"
            );
        }
        if existing.state == ObjectState::Started {
            return Ok(existing);
        }
        tracing::info!(pool = pool.name(), state = %existing.state, "starting shared pool");
        return start_and_wait(session, pool, settings).await;
    }

    tracing::info!(pool = pool.name(), "creating shared pool");
    session.add_pool(pool.spec())?;
    session.commit().await?;
    wait_for_state(session, pool, ObjectState::Started, settings).await
}

/// Stop the shared pool and wait until the host reports it stopped.
///
/// # Errors
///
/// Returns the host's error, or `Fatal` on timeout.
pub async fn stop_and_wait(
    session: &mut impl HostSession,
    pool: &PoolHandle,
    settings: &SiteSettings,
) -> Result<PoolRecord> {
    tracing::debug!(pool = pool.name(), "stopping shared pool");
    session.stop_pool(pool.name()).await?;
    wait_for_state(session, pool, ObjectState::Stopped, settings).await
}

/// Start the shared pool and wait until the host reports it started.
///
/// # Errors
///
/// Returns the host's error, or `Fatal` on timeout.
pub async fn start_and_wait(
    session: &mut impl HostSession,
    pool: &PoolHandle,
    settings: &SiteSettings,
) -> Result<PoolRecord> {
    tracing::debug!(pool = pool.name(), "starting shared pool");
    session.start_pool(pool.name()).await?;
    wait_for_state(session, pool, ObjectState::Started, settings).await
}

/// Poll the host until the pool reaches `target`.
async fn wait_for_state(
    session: &mut impl HostSession,
    pool: &PoolHandle,
    target: ObjectState,
    settings: &SiteSettings,
) -> Result<PoolRecord> {
    let deadline = Instant::now() + settings.pool_state_timeout;
    loop {
        session.refresh().await?;
        let record = session.pool(pool.name()).ok_or_else(|| {
            SiteError::Configuration(format!("pool '{}' is not registered", pool.name()))
        })?;
        if record.state == target {
            tracing::debug!(pool = pool.name(), state = %target, "pool reached state");
            return Ok(record);
        }
        if Instant::now() >= deadline {
            return Err(SiteError::Fatal(format!(
                "pool '{}' stuck in state '{}' waiting for '{target}' after {}s",
                pool.name(),
                record.state,
                settings.pool_state_timeout.as_secs()
            ))
            .into());
        }
        tokio::time::sleep(settings.poll_interval).await;
    }
}
