//! Property-based tests for port allocation and input validation.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use sitehost_cli::application::ports::HostManager;
use sitehost_cli::application::services::port_allocator::allocate;
use sitehost_cli::domain::config::VALID_CONFIG_KEYS;
use sitehost_cli::domain::{
    validate_application_name, validate_config_key, validate_config_value,
    validate_relative_web_root,
};
use sitehost_common::{ObjectState, PoolSpec, SiteSpec};

use crate::mocks::{FakeHost, FakeListeners, Journal, settings};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime")
}

// ============================================================================
// allocate() property tests
// ============================================================================

proptest! {
    /// The allocated port is inside the range and held by neither a site nor
    /// an OS listener.
    #[test]
    fn prop_allocated_port_is_free(
        seed in any::<u64>(),
        registered in prop::collection::btree_set(20_000u16..=20_030, 0..12),
        listening in prop::collection::btree_set(20_000u16..=20_030, 0..12),
    ) {
        let journal = Journal::default();
        let host = FakeHost::with_pool(&journal, ObjectState::Started);
        for port in &registered {
            host.seed_site(SiteSpec {
                name: format!("seeded{port}"),
                physical_path: PathBuf::from("/srv"),
                port: *port,
                pool: PoolSpec::SHARED_NAME.to_string(),
            });
        }
        let listeners = FakeListeners::occupied(listening.iter().copied());
        let mut settings = settings(20_000, 20_030);
        settings.max_port_attempts = 5000;

        let taken: BTreeSet<u16> = registered.union(&listening).copied().collect();
        let port = runtime().block_on(async {
            let session = host.open().await.expect("open");
            let mut rng = StdRng::seed_from_u64(seed);
            allocate(&session, &listeners, &settings, &mut rng).await
        }).expect("at least nine ports stay free");

        prop_assert!((20_000..=20_030).contains(&port));
        prop_assert!(!taken.contains(&port), "returned taken port {port}");
    }
}

// ============================================================================
// Name and path validation property tests
// ============================================================================

proptest! {
    /// Lowercase alphanumerics with inner hyphens are accepted.
    #[test]
    fn prop_well_formed_names_accepted(name in "[a-z0-9]([a-z0-9-]{0,20}[a-z0-9])?") {
        prop_assert!(validate_application_name(&name).is_ok(), "rejected {name}");
    }

    /// Any name with an uppercase letter, underscore or dot is rejected.
    #[test]
    fn prop_names_with_foreign_chars_rejected(
        head in "[a-z0-9]{1,10}",
        bad in "[A-Z_. ]",
        tail in "[a-z0-9]{1,10}",
    ) {
        let name = format!("{head}{bad}{tail}");
        prop_assert!(validate_application_name(&name).is_err(), "accepted {name}");
    }

    /// Names longer than 63 characters are rejected.
    #[test]
    fn prop_long_names_rejected(name in "[a-z]{64,80}") {
        prop_assert!(validate_application_name(&name).is_err());
    }

    /// Paths made of plain segments stay inside the web root.
    #[test]
    fn prop_plain_segments_accepted(segments in prop::collection::vec("[a-z0-9_-]{1,8}", 0..4)) {
        let relative = segments.join("/");
        let path = validate_relative_web_root(&relative).expect("plain path");
        prop_assert_eq!(path, PathBuf::from(&relative));
    }

    /// A `..` segment anywhere is rejected.
    #[test]
    fn prop_parent_segment_rejected(
        before in prop::collection::vec("[a-z]{1,5}", 0..3),
        after in prop::collection::vec("[a-z]{1,5}", 0..3),
    ) {
        let mut segments = before;
        segments.push("..".to_string());
        segments.extend(after);
        prop_assert!(validate_relative_web_root(&segments.join("/")).is_err());
    }
}

// ============================================================================
// validate_config_key() and validate_config_value() property tests
// ============================================================================

proptest! {
    /// Arbitrary keys (not in whitelist) are rejected.
    #[test]
    fn prop_arbitrary_keys_rejected(key in "[a-z_]{1,20}\\.[a-z_]{1,20}") {
        if !VALID_CONFIG_KEYS.contains(&key.as_str()) {
            prop_assert!(validate_config_key(&key).is_err(), "accepted invalid key: {key}");
        }
    }

    /// Ports in the well-known range are rejected.
    #[test]
    fn prop_well_known_ports_rejected(port in 0u16..1025) {
        prop_assert!(validate_config_value("ports.min", &port.to_string()).is_err());
        prop_assert!(validate_config_value("ports.max", &port.to_string()).is_err());
    }
}

#[test]
fn test_config_key_whitelist() {
    for key in VALID_CONFIG_KEYS {
        assert!(validate_config_key(key).is_ok(), "{key}");
    }
    assert!(validate_config_key("").is_err());
    assert!(validate_config_key("security.level").is_err());
}
