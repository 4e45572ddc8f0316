//! Site domain rules: application names, web root sub-paths, and the
//! placeholder page written into a fresh live site.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::domain::error::SiteError;

/// Page served by a live site until the first deployment replaces it.
pub const PLACEHOLDER_PAGE: &str = r#"<html>
<head>
<title>The web site is under construction</title>
<style type="text/css">
 BODY { color: #444444; background-color: #E5F2FF; font-family: verdana; margin: 0px; text-align: center; margin-top: 100px; }
 H1 { font-size: 16pt; margin-bottom: 4px; }
</style>
</head>
<body>
<h1>The web site is under construction</h1><br/>
</body>
</html>
"#;

/// File name of the placeholder page inside the web root.
pub const PLACEHOLDER_FILE: &str = "index.html";

/// Validate an application name.
///
/// # Errors
///
/// Returns [`SiteError::InvalidName`] if the name does not match
/// `^[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?$`.
pub fn validate_application_name(name: &str) -> Result<()> {
    sitehost_common::validate_application_name(name).map_err(|reason| SiteError::InvalidName {
        name: name.to_string(),
        reason,
    })?;
    Ok(())
}

/// Validate a web root sub-path relative to the developer web root.
///
/// An empty path selects the web root itself.
///
/// # Errors
///
/// Returns [`SiteError::Configuration`] if the path is absolute or escapes
/// the web root with `..`.
pub fn validate_relative_web_root(relative: &str) -> Result<PathBuf> {
    let path = Path::new(relative);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(SiteError::Configuration(format!(
                    "web root '{relative}' must be a relative path inside the site"
                ))
                .into());
            }
        }
    }
    Ok(path.to_path_buf())
}
