//! Tests for `site_status::application_status`.

#![allow(clippy::expect_used)]

use sitehost_cli::application::services::site_provisioner::{create, create_developer_site};
use sitehost_cli::application::services::site_status::application_status;
use sitehost_cli::domain::SiteError;
use sitehost_common::{ObjectState, SiteRole, site_url};

use crate::mocks::Harness;

#[tokio::test]
async fn lists_sites_in_role_order_with_urls() {
    let h = Harness::new();
    create(&h.ctx(), &h.reporter, "contoso").await.expect("create");
    create_developer_site(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect("dev site");

    let status = application_status(&h.host, &h.pool, "contoso")
        .await
        .expect("status");

    assert!(status.exists());
    assert_eq!(status.application, "contoso");
    let roles: Vec<SiteRole> = status.sites.iter().map(|s| s.role).collect();
    assert_eq!(roles, vec![SiteRole::Service, SiteRole::Live, SiteRole::Dev]);
    for site in &status.sites {
        assert_eq!(site.url, site_url(site.port));
        assert_eq!(site.state, ObjectState::Started);
    }
    let pool = status.pool.expect("pool record");
    assert_eq!(pool.state, ObjectState::Started);
}

#[tokio::test]
async fn unknown_application_on_fresh_host() {
    let h = Harness::new();

    let status = application_status(&h.host, &h.pool, "contoso")
        .await
        .expect("status");

    assert!(!status.exists());
    assert!(status.pool.is_none());
    assert_eq!(h.host.commits(), 0, "status never writes");
}

#[tokio::test]
async fn invalid_name_is_rejected() {
    let h = Harness::new();

    let err = application_status(&h.host, &h.pool, "Not_Valid")
        .await
        .expect_err("invalid name");

    assert!(matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::InvalidName { .. })
    ));
}
