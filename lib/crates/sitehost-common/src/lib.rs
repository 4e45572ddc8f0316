pub mod host;
pub mod names;
pub mod types;

pub use host::{HostChange, HostChangeError, HostSnapshot, HostView};
pub use names::{
    WEB_ROOT, mapped, prefix, site_name, site_url, validate_application_name,
};
pub use types::*;
