//! Application teardown: unregister every site of an application, then delete
//! its directories while the shared pool is stopped.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};
use sitehost_common::{SiteRole, site_name};

use super::{SiteContext, pool_manager};
use crate::application::ports::{
    HostManager, HostSession, ListenerProbe, LocalFs, PathResolver, ProgressReporter,
};
use crate::domain::{SiteError, Stage, validate_application_name};

/// Remove all sites and directories of `application`.
///
/// Every step tolerates missing state, so deleting an application that was
/// never created (or was half-created) succeeds.
///
/// # Errors
///
/// Returns the failing step's error tagged with its [`Stage`]. A pool that
/// cannot be restarted after the directory cleanup is reported as
/// [`SiteError::Fatal`] with [`Stage::RestartPool`].
pub async fn delete<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    reporter: &impl ProgressReporter,
    application: &str,
) -> Result<()>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    validate_application_name(application)?;
    let _guard = ctx.pool.lock().await;
    delete_locked(ctx, reporter, application).await?;
    tracing::info!(application, "application deleted");
    Ok(())
}

/// [`delete`] for callers already holding the pool lock.
pub(crate) async fn delete_locked<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    reporter: &impl ProgressReporter,
    application: &str,
) -> Result<()>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let mut session = ctx.host.open().await.context(Stage::EnsurePool)?;
    pool_manager::ensure_pool(&mut session, ctx.pool, ctx.settings)
        .await
        .context(Stage::EnsurePool)?;

    reporter.step("removing sites...");
    let mut removed = 0;
    for (role, delete_files) in [
        (SiteRole::Live, true),
        (SiteRole::Dev, true),
        (SiteRole::Service, false),
    ] {
        let name = site_name(application, role);
        if remove_site(&mut session, ctx.fs, &name, delete_files)
            .await
            .context(Stage::RemoveSites)?
        {
            removed += 1;
        }
    }
    session.commit().await.context(Stage::Commit)?;
    tracing::debug!(application, removed, "site removals committed");

    reporter.step("deleting application files...");
    let cleanup = async {
        pool_manager::stop_and_wait(&mut session, ctx.pool, ctx.settings).await?;
        for dir in [
            ctx.paths.live_site_root(application),
            ctx.paths.developer_site_root(application),
            ctx.paths.application_root(application),
        ] {
            if ctx.fs.remove_dir_all_if_exists(&dir)? {
                tracing::debug!(application, path = %dir.display(), "directory deleted");
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    let restart = pool_manager::start_and_wait(&mut session, ctx.pool, ctx.settings).await;
    match (cleanup, restart) {
        (cleanup, Err(restart_err)) => {
            if let Err(err) = cleanup {
                tracing::error!(application, error = %format!("{err:#}"), "file cleanup failed");
            }
            tracing::error!(
                pool = ctx.pool.name(),
                error = %format!("{restart_err:#}"),
                "shared pool could not be restarted"
            );
            Err(anyhow::Error::from(SiteError::Fatal(format!(
                "shared pool '{}' could not be restarted: {restart_err:#}",
                ctx.pool.name()
            )))
            .context(Stage::RestartPool))
        }
        (Err(err), Ok(_)) => Err(err.context(Stage::DeleteFiles)),
        (Ok(()), Ok(_)) => {
            reporter.success("application removed");
            Ok(())
        }
    }
}

/// Stop and unregister one site, deleting its physical directory first when
/// `delete_files` is set. Returns `false` if the site is not registered.
async fn remove_site(
    session: &mut impl HostSession,
    fs: &impl LocalFs,
    name: &str,
    delete_files: bool,
) -> Result<bool> {
    let Some(site) = session.site(name) else {
        return Ok(false);
    };
    session.stop_site(name).await?;
    if delete_files {
        fs.remove_dir_all_if_exists(&site.physical_path)?;
    }
    session.remove_site(name)?;
    tracing::info!(site = name, port = site.port, "site removed");
    Ok(true)
}
