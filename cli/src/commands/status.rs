//! `sitehost status <application>`: show registered sites and the shared pool.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::site_status;
use crate::output::Renderer;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Application name
    pub application: String,
}

/// Run `sitehost status`.
///
/// # Errors
///
/// Returns an error if the name is invalid or the registry cannot be read.
pub async fn run(app: &AppContext, args: &StatusArgs) -> Result<ExitCode> {
    let status = site_status::application_status(&app.host, &app.pool, &args.application).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_status(&status),
        Renderer::Json(r) => r.render_status(&status)?,
    }
    Ok(ExitCode::SUCCESS)
}
