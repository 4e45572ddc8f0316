//! `sitehost create <application>`: provision the service and live sites.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::site_provisioner;
use crate::output::Renderer;

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Application name (lowercase letters, digits and hyphens)
    pub application: String,
}

/// Run `sitehost create`.
///
/// # Errors
///
/// Returns the provisioning error after the partial sites were rolled back.
pub async fn run(app: &AppContext, args: &CreateArgs) -> Result<ExitCode> {
    let urls =
        site_provisioner::create(&app.sites(), &app.reporter(), &args.application).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_created(&args.application, &urls),
        Renderer::Json(r) => r.render_created(&args.application, &urls)?,
    }
    Ok(ExitCode::SUCCESS)
}
