//! Application service: read-only status of an application's sites.

use anyhow::Result;
use sitehost_common::{ApplicationStatus, SiteRole, SiteSummary, site_name, site_url};

use super::PoolHandle;
use crate::application::ports::{HostManager, HostSession};
use crate::domain::validate_application_name;

/// List the registered sites of `application` (service, live, dev order)
/// and the shared pool record.
///
/// Takes no lock and stages nothing.
///
/// # Errors
///
/// Returns an error if the name is invalid or the host cannot be read.
pub async fn application_status(
    host: &impl HostManager,
    pool: &PoolHandle,
    application: &str,
) -> Result<ApplicationStatus> {
    validate_application_name(application)?;
    let session = host.open().await?;

    let sites = SiteRole::ALL
        .into_iter()
        .filter_map(|role| {
            session
                .site(&site_name(application, role))
                .map(|site| SiteSummary {
                    role,
                    url: site_url(site.port),
                    name: site.name,
                    port: site.port,
                    physical_path: site.physical_path,
                    state: site.state,
                })
        })
        .collect();

    Ok(ApplicationStatus {
        application: application.to_string(),
        sites,
        pool: session.pool(pool.name()),
    })
}
