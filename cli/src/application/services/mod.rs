//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_service;
pub mod pool_manager;
pub mod port_allocator;
pub mod site_deprovisioner;
pub mod site_provisioner;
pub mod site_status;

use crate::domain::SiteSettings;
pub use pool_manager::PoolHandle;

/// Collaborators shared by every site orchestration call.
///
/// Bundled so the provisioning and teardown services take one argument
/// instead of six; every field is borrowed from the caller.
pub struct SiteContext<'a, H, L, P, F> {
    /// Host management entry point; each call opens its own session.
    pub host: &'a H,
    /// OS listener table.
    pub listeners: &'a L,
    /// Application name to filesystem locations.
    pub paths: &'a P,
    /// Filesystem operations.
    pub fs: &'a F,
    /// The shared pool and the host mutation lock.
    pub pool: &'a PoolHandle,
    /// Port range and wait bounds.
    pub settings: &'a SiteSettings,
}
