//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document to
//! stdout: the command's result, or the error object from [`format_error`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use sitehost_common::{ApplicationStatus, SiteUrls};

use crate::domain::SitehostConfig;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders command results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_created(&self, application: &str, urls: &SiteUrls) -> Result<()> {
        print_json(&serde_json::json!({
            "application": application,
            "service_url": urls.service_url,
            "site_url": urls.site_url,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_deleted(&self, application: &str) -> Result<()> {
        print_json(&serde_json::json!({
            "application": application,
            "deleted": true,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_developer_site(&self, application: &str, url: Option<&str>) -> Result<()> {
        print_json(&serde_json::json!({
            "application": application,
            "created": url.is_some(),
            "url": url,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_web_root(&self, application: &str, changed: bool) -> Result<()> {
        print_json(&serde_json::json!({
            "application": application,
            "changed": changed,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_status(&self, status: &ApplicationStatus) -> Result<()> {
        print_json(status)
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_config(&self, config: &SitehostConfig, path: &Path) -> Result<()> {
        print_json(&serde_json::json!({
            "path": path,
            "config": config,
        }))
    }

    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        print_json(&serde_json::json!({ "version": version }))
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
