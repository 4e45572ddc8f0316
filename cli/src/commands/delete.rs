//! `sitehost delete <application>`: remove all sites and files of an application.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::site_deprovisioner;
use crate::output::Renderer;

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Application name
    pub application: String,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Run `sitehost delete`.
///
/// # Errors
///
/// Returns an error if the prompt fails or a teardown step fails.
pub async fn run(app: &AppContext, args: &DeleteArgs) -> Result<ExitCode> {
    if !args.yes && !app.is_json() {
        if !app.output.quiet {
            println!();
            println!(
                "This will remove every site of '{}' and delete its files.",
                args.application
            );
            println!("The shared pool is stopped briefly while files are deleted.");
            println!();
        }
        if !app.confirm("Continue?", false)? {
            app.output.info("Cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    site_deprovisioner::delete(&app.sites(), &app.reporter(), &args.application).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_deleted(&args.application),
        Renderer::Json(r) => r.render_deleted(&args.application)?,
    }
    Ok(ExitCode::SUCCESS)
}
