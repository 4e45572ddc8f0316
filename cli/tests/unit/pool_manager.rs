//! Tests for the shared pool lifecycle.

#![allow(clippy::expect_used)]

use sitehost_cli::application::ports::HostManager;
use sitehost_cli::application::services::pool_manager::{ensure_pool, stop_and_wait};
use sitehost_cli::domain::SiteError;
use sitehost_common::{ObjectState, PipelineMode, PoolSpec};

use crate::mocks::{FakeHost, Harness, Journal, Transition};

#[tokio::test(start_paused = true)]
async fn missing_pool_is_created_started_and_reused() {
    let h = Harness::new();
    h.host.pool_transition(Transition::AfterRefreshes(3));

    let mut session = h.host.open().await.expect("open");
    let pool = ensure_pool(&mut session, &h.pool, &h.settings)
        .await
        .expect("ensure");
    assert_eq!(pool.state, ObjectState::Started);
    assert_eq!(pool.spec.name, PoolSpec::SHARED_NAME);
    assert_eq!(pool.spec.runtime_version, "v4.0");
    assert_eq!(pool.spec.pipeline_mode, PipelineMode::Integrated);
    assert!(pool.spec.enable_32bit);
    assert_eq!(h.host.commits(), 1);

    let mut session = h.host.open().await.expect("open");
    let again = ensure_pool(&mut session, &h.pool, &h.settings)
        .await
        .expect("ensure again");
    assert_eq!(again, pool);
    assert_eq!(h.host.commits(), 1, "second call must not re-create the pool");
}

#[tokio::test]
async fn started_pool_is_left_alone() {
    let journal = Journal::default();
    let h = Harness::with_host(FakeHost::with_pool(&journal, ObjectState::Started), journal);

    let mut session = h.host.open().await.expect("open");
    ensure_pool(&mut session, &h.pool, &h.settings)
        .await
        .expect("ensure");
    assert_eq!(h.host.commits(), 0);
    assert_eq!(h.journal.count("start_pool"), 0);
}

#[tokio::test]
async fn stopped_pool_is_started() {
    let journal = Journal::default();
    let h = Harness::with_host(FakeHost::with_pool(&journal, ObjectState::Stopped), journal);

    let mut session = h.host.open().await.expect("open");
    let pool = ensure_pool(&mut session, &h.pool, &h.settings)
        .await
        .expect("ensure");
    assert_eq!(pool.state, ObjectState::Started);
    assert_eq!(h.journal.count("start_pool"), 1);
}

#[tokio::test(start_paused = true)]
async fn stuck_transition_is_fatal() {
    let journal = Journal::default();
    let h = Harness::with_host(FakeHost::with_pool(&journal, ObjectState::Started), journal);
    h.host.pool_transition(Transition::Never);

    let mut session = h.host.open().await.expect("open");
    let err = stop_and_wait(&mut session, &h.pool, &h.settings)
        .await
        .expect_err("stuck");
    assert!(
        matches!(err.downcast_ref::<SiteError>(), Some(SiteError::Fatal(_))),
        "unexpected error: {err:#}"
    );
    assert_eq!(
        h.host.pool().map(|p| p.state),
        Some(ObjectState::Stopping)
    );
}
