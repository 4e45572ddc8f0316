//! Site provisioning: the service/live pair of an application, the
//! developer site, and re-pointing the developer web root.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sitehost_common::{
    ObjectState, SiteRole, SiteSpec, SiteUrls, WEB_ROOT, mapped, site_name, site_url,
};
use tokio::time::Instant;

use super::{SiteContext, pool_manager, port_allocator, site_deprovisioner};
use crate::application::ports::{
    HostManager, HostSession, ListenerProbe, LocalFs, PathResolver, ProgressReporter,
};
use crate::domain::site::{PLACEHOLDER_FILE, PLACEHOLDER_PAGE};
use crate::domain::{
    SiteError, SiteSettings, Stage, validate_application_name, validate_relative_web_root,
};

/// Outcome of [`create_developer_site`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevSiteOutcome {
    /// The developer site was registered and is reachable at `url`.
    Created { url: String },
    /// A developer site already exists for the application.
    AlreadyExists,
}

impl DevSiteOutcome {
    #[must_use]
    pub fn created(&self) -> bool {
        matches!(self, DevSiteOutcome::Created { .. })
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            DevSiteOutcome::Created { url } => Some(url),
            DevSiteOutcome::AlreadyExists => None,
        }
    }
}

/// Create the service and live sites of `application`.
///
/// Registers both sites, writes a placeholder page into the live web root,
/// maps the live root under the service site and commits everything as one
/// batch, then waits until the host reports both sites started.
///
/// Any failure removes whatever was created for the application before the
/// original error is returned.
///
/// # Errors
///
/// Returns the first failing step's error, tagged with its [`Stage`].
pub async fn create<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    reporter: &impl ProgressReporter,
    application: &str,
) -> Result<SiteUrls>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    validate_application_name(application)?;
    let _guard = ctx.pool.lock().await;

    // Checked before any change so the rollback never touches an existing
    // application.
    let existing = ctx.host.open().await.context(Stage::EnsurePool)?;
    for (role, stage) in [
        (SiteRole::Service, Stage::ServiceSite),
        (SiteRole::Live, Stage::LiveSite),
    ] {
        let name = site_name(application, role);
        if existing.site(&name).is_some() {
            return Err(SiteError::Configuration(format!(
                "site '{name}' already exists; delete the application first"
            )))
            .context(stage);
        }
    }

    tracing::info!(application, "creating application sites");
    match create_locked(ctx, reporter, application).await {
        Ok(urls) => {
            tracing::info!(
                application,
                service_url = %urls.service_url,
                site_url = %urls.site_url,
                "application created"
            );
            Ok(urls)
        }
        Err(err) => {
            tracing::warn!(application, error = %format!("{err:#}"), "create failed, rolling back");
            reporter.warn("creation failed, removing partially created sites...");
            if let Err(cleanup) =
                site_deprovisioner::delete_locked(ctx, reporter, application).await
            {
                tracing::error!(application, error = %format!("{cleanup:#}"), "rollback failed");
                reporter.warn(&format!("rollback incomplete: {cleanup:#}"));
            }
            Err(err)
        }
    }
}

async fn create_locked<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    reporter: &impl ProgressReporter,
    application: &str,
) -> Result<SiteUrls>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let mut session = ctx.host.open().await.context(Stage::EnsurePool)?;
    let mut rng = StdRng::from_entropy();

    reporter.step("preparing shared pool...");
    pool_manager::ensure_pool(&mut session, ctx.pool, ctx.settings)
        .await
        .context(Stage::EnsurePool)?;

    reporter.step("registering service site...");
    let service_name = site_name(application, SiteRole::Service);
    let service_root = ctx.paths.service_site_root();
    let service_port = async {
        ctx.fs.create_dir_all(&service_root)?;
        register_site(ctx, &mut session, &mut rng, &service_name, service_root.clone()).await
    }
    .await
    .context(Stage::ServiceSite)?;

    reporter.step("registering live site...");
    let live_name = site_name(application, SiteRole::Live);
    let site_root = ctx.paths.live_site_root(application);
    let live_port = create_live_site(ctx, &mut session, &mut rng, &live_name, &site_root)
        .await
        .context(Stage::LiveSite)?;

    map_service_path(&mut session, application, mapped::LIVE, &site_root)
        .context(Stage::PathMapping)?;

    reporter.step("committing sites...");
    session.commit().await.context(Stage::Commit)?;

    reporter.step("waiting for sites to start...");
    settle(&mut session, &[&service_name, &live_name], ctx.settings)
        .await
        .context(Stage::Settle)?;
    reporter.success("sites started");

    Ok(SiteUrls {
        service_url: site_url(service_port),
        site_url: site_url(live_port),
    })
}

/// Create the developer site of `application` if it does not exist yet.
///
/// The application's service site must already exist; the developer root is
/// mapped under it. A failure removes the developer site again (and its
/// directory, if this call created it) before the error is returned.
///
/// # Errors
///
/// Returns the first failing step's error, tagged with its [`Stage`].
pub async fn create_developer_site<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    reporter: &impl ProgressReporter,
    application: &str,
) -> Result<DevSiteOutcome>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    validate_application_name(application)?;
    let _guard = ctx.pool.lock().await;

    let mut session = ctx.host.open().await.context(Stage::DeveloperSite)?;
    let dev_name = site_name(application, SiteRole::Dev);
    if session.site(&dev_name).is_some() {
        tracing::debug!(application, site = %dev_name, "developer site already exists");
        return Ok(DevSiteOutcome::AlreadyExists);
    }

    let site_root = ctx.paths.developer_site_root(application);
    let created_root = !ctx.fs.exists(&site_root);

    match create_developer_locked(ctx, &mut session, reporter, application, &site_root).await {
        Ok(url) => {
            tracing::info!(application, url = %url, "developer site created");
            Ok(DevSiteOutcome::Created { url })
        }
        Err(err) => {
            tracing::warn!(
                application,
                error = %format!("{err:#}"),
                "developer site creation failed, rolling back"
            );
            reporter.warn("developer site creation failed, removing it...");
            rollback_developer_site(ctx, application, &site_root, created_root).await;
            Err(err)
        }
    }
}

async fn create_developer_locked<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    session: &mut H::Session,
    reporter: &impl ProgressReporter,
    application: &str,
    site_root: &Path,
) -> Result<String>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let mut rng = StdRng::from_entropy();

    pool_manager::ensure_pool(session, ctx.pool, ctx.settings)
        .await
        .context(Stage::EnsurePool)?;

    let service_name = site_name(application, SiteRole::Service);
    if session.site(&service_name).is_none() {
        return Err(SiteError::Configuration(format!(
            "application '{application}' has no service site; create the application first"
        )))
        .context(Stage::DeveloperSite);
    }

    reporter.step("registering developer site...");
    let dev_name = site_name(application, SiteRole::Dev);
    let web_root = site_root.join(WEB_ROOT);
    let port = async {
        let port =
            port_allocator::allocate(&*session, ctx.listeners, ctx.settings, &mut rng).await?;
        ctx.fs.create_dir_all(&web_root)?;
        session.add_site(SiteSpec {
            name: dev_name.clone(),
            physical_path: web_root.clone(),
            port,
            pool: ctx.pool.name().to_string(),
        })?;
        Ok::<u16, anyhow::Error>(port)
    }
    .await
    .context(Stage::DeveloperSite)?;

    map_service_path(session, application, mapped::DEV, site_root).context(Stage::PathMapping)?;

    session.commit().await.context(Stage::Commit)?;
    settle(session, &[&dev_name], ctx.settings)
        .await
        .context(Stage::Settle)?;
    reporter.success("developer site started");

    Ok(site_url(port))
}

/// Best-effort removal of a half-created developer site.
async fn rollback_developer_site<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    application: &str,
    site_root: &Path,
    remove_root: bool,
) where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let dev_name = site_name(application, SiteRole::Dev);
    let result = async {
        let mut session = ctx.host.open().await?;
        if session.site(&dev_name).is_some() {
            session.stop_site(&dev_name).await?;
            session.remove_site(&dev_name)?;
            session.commit().await?;
        }
        if remove_root {
            ctx.fs.remove_dir_all_if_exists(site_root)?;
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;
    if let Err(err) = result {
        tracing::error!(
            application,
            error = %format!("{err:#}"),
            "developer site rollback failed"
        );
    }
}

/// Point the developer site's root virtual directory at
/// `<developer root>/wwwroot/<relative>`.
///
/// Returns `false` without touching the host when the application has no
/// developer site.
///
/// # Errors
///
/// Returns an error if `relative` escapes the web root, or if the commit or
/// the wait for the site to restart fails.
pub async fn set_developer_site_web_root<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    application: &str,
    relative: &str,
) -> Result<bool>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    validate_application_name(application)?;
    let relative = validate_relative_web_root(relative).context(Stage::WebRoot)?;
    let _guard = ctx.pool.lock().await;

    let mut session = ctx.host.open().await.context(Stage::WebRoot)?;
    let dev_name = site_name(application, SiteRole::Dev);
    if session.site(&dev_name).is_none() {
        tracing::debug!(application, "no developer site, web root unchanged");
        return Ok(false);
    }

    let web_root: PathBuf = ctx
        .paths
        .developer_site_root(application)
        .join(WEB_ROOT)
        .join(relative);
    session
        .set_physical_path(&dev_name, &web_root)
        .context(Stage::WebRoot)?;
    session.commit().await.context(Stage::Commit)?;
    settle(&mut session, &[&dev_name], ctx.settings)
        .await
        .context(Stage::Settle)?;

    tracing::info!(application, web_root = %web_root.display(), "developer web root changed");
    Ok(true)
}

// ── Private helpers ──────────────────────────────────────────────────────────

/// Allocate a port and stage a site bound to it on the shared pool.
async fn register_site<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    session: &mut H::Session,
    rng: &mut StdRng,
    name: &str,
    physical_path: PathBuf,
) -> Result<u16>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let port = port_allocator::allocate(&*session, ctx.listeners, ctx.settings, rng).await?;
    session.add_site(SiteSpec {
        name: name.to_string(),
        physical_path,
        port,
        pool: ctx.pool.name().to_string(),
    })?;
    tracing::info!(site = name, port, "site staged");
    Ok(port)
}

async fn create_live_site<H, L, P, F>(
    ctx: &SiteContext<'_, H, L, P, F>,
    session: &mut H::Session,
    rng: &mut StdRng,
    name: &str,
    site_root: &Path,
) -> Result<u16>
where
    H: HostManager,
    L: ListenerProbe,
    P: PathResolver,
    F: LocalFs,
{
    let web_root = site_root.join(WEB_ROOT);
    ctx.fs.create_dir_all(&web_root)?;
    ctx.fs
        .write(&web_root.join(PLACEHOLDER_FILE), PLACEHOLDER_PAGE)?;
    register_site(ctx, session, rng, name, web_root).await
}

/// Map `path` under the application's service site to `site_root`.
///
/// A mapping left behind by an earlier attempt is reused when it already
/// points at `site_root`.
fn map_service_path(
    session: &mut impl HostSession,
    application: &str,
    path: &str,
    site_root: &Path,
) -> Result<()> {
    let service_name = site_name(application, SiteRole::Service);
    let Some(service) = session.site(&service_name) else {
        return Err(SiteError::Configuration(format!(
            "could not retrieve service site '{service_name}'"
        ))
        .into());
    };
    match service.application(path) {
        Some(existing) if existing.physical_path == site_root => Ok(()),
        Some(existing) => Err(SiteError::Configuration(format!(
            "'{path}' in '{service_name}' already maps to {}",
            existing.physical_path.display()
        ))
        .into()),
        None => session.add_application(&service_name, path, site_root),
    }
}

/// Wait until every named site reports `started`.
async fn settle(
    session: &mut impl HostSession,
    names: &[&str],
    settings: &SiteSettings,
) -> Result<()> {
    let deadline = Instant::now() + settings.settle_timeout;
    loop {
        session.refresh().await?;
        let mut pending = Vec::new();
        for name in names {
            match session.site(name) {
                Some(site) if site.state == ObjectState::Started => {}
                Some(site) => pending.push(format!("{name} ({})", site.state)),
                None => {
                    return Err(SiteError::Configuration(format!(
                        "site '{name}' disappeared after commit"
                    ))
                    .into());
                }
            }
        }
        if pending.is_empty() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(SiteError::host(
                "settle",
                format!(
                    "sites not started after {}s: {}",
                    settings.settle_timeout.as_secs(),
                    pending.join(", ")
                ),
            )
            .into());
        }
        tokio::time::sleep(settings.poll_interval).await;
    }
}
