//! Tests for `site_deprovisioner::delete`.

#![allow(clippy::expect_used)]

use std::path::Path;

use sitehost_cli::application::ports::LocalFs;
use sitehost_cli::application::services::site_deprovisioner::delete;
use sitehost_cli::application::services::site_provisioner::{create, create_developer_site};
use sitehost_cli::domain::{SiteError, Stage};
use sitehost_common::ObjectState;

use crate::mocks::Harness;

async fn with_application(dev: bool) -> Harness {
    let h = Harness::new();
    create(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect("create application");
    if dev {
        create_developer_site(&h.ctx(), &h.reporter, "contoso")
            .await
            .expect("create developer site");
    }
    h
}

#[tokio::test]
async fn removes_every_site_and_directory() {
    let h = with_application(true).await;
    assert_eq!(h.host.sites_of("contoso").len(), 3);

    delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect("delete");

    assert!(h.host.sites_of("contoso").is_empty());
    assert!(h.fs.entries_under(Path::new("/data/apps/contoso")).is_empty());
    assert!(h.fs.exists(Path::new("/data/service")), "shared service root stays");
    assert_eq!(h.host.pool().map(|p| p.state), Some(ObjectState::Started));
}

#[tokio::test]
async fn other_applications_are_untouched() {
    let h = with_application(false).await;
    create(&h.ctx(), &h.reporter, "fabrikam")
        .await
        .expect("create fabrikam");

    delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect("delete");

    assert_eq!(h.host.sites_of("fabrikam").len(), 2);
    assert!(
        h.fs
            .read(Path::new("/data/apps/fabrikam/live/wwwroot/index.html"))
            .is_some()
    );
}

#[tokio::test]
async fn directories_are_deleted_while_the_pool_is_stopped() {
    let h = with_application(false).await;

    delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect("delete");

    let events = h.journal.events();
    let at = |event: &str| {
        events
            .iter()
            .position(|e| e == event)
            .unwrap_or_else(|| panic!("missing {event} in {events:?}"))
    };
    let stop_site = at("stop_site:sitehost_contoso");
    let commit = events.iter().rposition(|e| e == "commit").expect("commit");
    let stop_pool = at("stop_pool");
    let rmdir = at("rmdir:/data/apps/contoso");
    let start_pool = events
        .iter()
        .rposition(|e| e == "start_pool")
        .expect("start_pool");

    assert!(stop_site < commit, "{events:?}");
    assert!(commit < stop_pool, "{events:?}");
    assert!(stop_pool < rmdir, "{events:?}");
    assert!(rmdir < start_pool, "{events:?}");
    assert_eq!(events.last().map(String::as_str), Some("start_pool"));
}

#[tokio::test]
async fn unknown_application_deletes_cleanly() {
    let h = Harness::new();

    delete(&h.ctx(), &h.reporter, "ghost")
        .await
        .expect("nothing to delete");
    delete(&h.ctx(), &h.reporter, "ghost")
        .await
        .expect("still nothing to delete");

    assert_eq!(h.host.pool().map(|p| p.state), Some(ObjectState::Started));
    assert_eq!(h.journal.count("stop_site:"), 0);
}

#[tokio::test]
async fn cleanup_failure_still_restarts_the_pool() {
    let h = with_application(false).await;
    h.fs.fail_remove(Path::new("/data/apps/contoso"));

    let err = delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect_err("cleanup failure");

    assert_eq!(err.downcast_ref::<Stage>(), Some(&Stage::DeleteFiles));
    assert!(matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::Filesystem { .. })
    ));
    assert!(h.host.sites_of("contoso").is_empty());
    assert_eq!(h.host.pool().map(|p| p.state), Some(ObjectState::Started));
    assert_eq!(h.journal.events().last().map(String::as_str), Some("start_pool"));
}

#[tokio::test]
async fn failed_restart_is_fatal() {
    let h = with_application(false).await;
    h.host.fail_start_pool_from(1);

    let err = delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect_err("restart failure");

    assert_eq!(err.downcast_ref::<Stage>(), Some(&Stage::RestartPool));
    assert!(matches!(
        err.downcast_ref::<SiteError>(),
        Some(SiteError::Fatal(_))
    ));
    assert!(h.host.sites_of("contoso").is_empty());
    assert!(h.fs.entries_under(Path::new("/data/apps/contoso")).is_empty());
    assert_eq!(h.host.pool().map(|p| p.state), Some(ObjectState::Stopped));
}

#[tokio::test]
async fn stop_failure_leaves_sites_registered() {
    let h = with_application(false).await;
    h.host.fail_stop_site();
    let commits = h.host.commits();

    let err = delete(&h.ctx(), &h.reporter, "contoso")
        .await
        .expect_err("stop failure");

    assert_eq!(err.downcast_ref::<Stage>(), Some(&Stage::RemoveSites));
    assert_eq!(h.host.sites_of("contoso").len(), 2);
    assert_eq!(h.host.commits(), commits);
    assert_eq!(h.journal.count("stop_pool"), 0);
}
