/// Site name prefixes, one per role.
///
/// Application names never contain `_`, so the role segment of a derived
/// name cannot be confused with part of an application name.
pub mod prefix {
    /// Format: sitehost_{application}
    pub const LIVE: &str = "sitehost_";

    /// Format: sitehost_dev_{application}
    pub const DEV: &str = "sitehost_dev_";

    /// Format: sitehost_service_{application}
    pub const SERVICE: &str = "sitehost_service_";
}

/// Virtual paths mapped under an application's service site.
pub mod mapped {
    /// Points at the live site root.
    pub const LIVE: &str = "/_app";

    /// Points at the developer site root.
    pub const DEV: &str = "/_devapp";
}

/// Name of the web root directory inside a site root.
pub const WEB_ROOT: &str = "wwwroot";

/// Maximum application name length (DNS label limit).
pub const MAX_APPLICATION_NAME_LEN: usize = 63;

use crate::types::SiteRole;

/// Derive the host-wide site name for an application role.
#[must_use]
pub fn site_name(application: &str, role: SiteRole) -> String {
    let prefix = match role {
        SiteRole::Live => prefix::LIVE,
        SiteRole::Dev => prefix::DEV,
        SiteRole::Service => prefix::SERVICE,
    };
    format!("{prefix}{application}")
}

/// Externally reachable URL of a site bound to `port`.
#[must_use]
pub fn site_url(port: u16) -> String {
    format!("http://localhost:{port}/")
}

/// Validate an application name: `^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$`.
/// Returns Ok(()) if valid, Err with description if invalid.
pub fn validate_application_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("application name must not be empty");
    }
    if name.len() > MAX_APPLICATION_NAME_LEN {
        return Err("application name must be at most 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("application name may only contain [a-z0-9-]");
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err("application name must start and end with [a-z0-9]");
    }
    Ok(())
}
