//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Provision and tear down local web sites for named applications
#[derive(Parser)]
#[command(
    name = "sitehost",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the service and live sites of an application
    Create(commands::create::CreateArgs),

    /// Remove all sites and files of an application
    Delete(commands::delete::DeleteArgs),

    /// Manage the developer site of an application
    #[command(subcommand)]
    Dev(commands::dev::DevCommand),

    /// Show the sites of an application
    Status(commands::status::StatusArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            no_color,
            quiet,
            json,
            command,
        } = self;
        let yes = matches!(&command, Command::Delete(args) if args.yes);
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes },
        })?;

        match command {
            Command::Create(args) => commands::create::run(&app, &args).await,
            Command::Delete(args) => commands::delete::run(&app, &args).await,
            Command::Dev(cmd) => commands::dev::run(&app, cmd).await,
            Command::Status(args) => commands::status::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}
