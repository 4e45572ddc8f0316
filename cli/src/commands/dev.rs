//! `sitehost dev`: developer site of an application.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::site_provisioner;
use crate::output::Renderer;

/// Developer site subcommands.
#[derive(Subcommand)]
pub enum DevCommand {
    /// Create the developer site of an existing application
    Create {
        /// Application name
        application: String,
    },
    /// Point the developer site at a directory under its web root
    Webroot {
        /// Application name
        application: String,
        /// Path relative to the developer web root (e.g. `dist`)
        path: String,
    },
}

/// Run a `sitehost dev` subcommand.
///
/// # Errors
///
/// Returns the orchestration error of the subcommand.
pub async fn run(app: &AppContext, cmd: DevCommand) -> Result<ExitCode> {
    match cmd {
        DevCommand::Create { application } => create(app, &application).await,
        DevCommand::Webroot { application, path } => web_root(app, &application, &path).await,
    }
}

async fn create(app: &AppContext, application: &str) -> Result<ExitCode> {
    let outcome =
        site_provisioner::create_developer_site(&app.sites(), &app.reporter(), application)
            .await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_developer_site(application, outcome.url()),
        Renderer::Json(r) => r.render_developer_site(application, outcome.url())?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn web_root(app: &AppContext, application: &str, path: &str) -> Result<ExitCode> {
    let changed =
        site_provisioner::set_developer_site_web_root(&app.sites(), application, path).await?;
    match app.renderer() {
        Renderer::Human(r) => r.render_web_root(application, path, changed),
        Renderer::Json(r) => r.render_web_root(application, changed)?,
    }
    Ok(ExitCode::SUCCESS)
}
