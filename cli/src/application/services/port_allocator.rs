//! Port allocation for new site bindings.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::collections::HashSet;

use anyhow::Result;
use rand::Rng;

use crate::application::ports::{HostSession, ListenerProbe};
use crate::domain::{SiteError, SiteSettings};

/// Pick a random port in the configured range that no OS listener holds and
/// no site visible in `session` is bound to.
///
/// Sites staged in `session` but not yet committed count as bound, so two
/// allocations inside one session never return the same port. Both sources
/// are read on every call.
///
/// # Errors
///
/// Returns [`SiteError::ResourceExhausted`] when `max_port_attempts`
/// candidates were all taken, or the listener probe's error.
pub async fn allocate(
    session: &impl HostSession,
    listeners: &impl ListenerProbe,
    settings: &SiteSettings,
    rng: &mut impl Rng,
) -> Result<u16> {
    let range = settings.ports;
    let bound: HashSet<u16> = session.sites().iter().map(|s| s.port).collect();

    for attempt in 1..=settings.max_port_attempts {
        let candidate = rng.gen_range(range.min..=range.max);
        if bound.contains(&candidate) {
            continue;
        }
        if listeners.is_port_in_use(candidate).await? {
            tracing::trace!(port = candidate, "port held by an OS listener");
            continue;
        }
        tracing::debug!(port = candidate, attempt, "allocated port");
        return Ok(candidate);
    }

    Err(SiteError::ResourceExhausted {
        min: range.min,
        max: range.max,
        attempts: settings.max_port_attempts,
    }
    .into())
}
