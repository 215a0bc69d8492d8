//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Dependency-ordered provisioning for small web application stacks
#[derive(Parser)]
#[command(
    name = "stratus",
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
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Realize a topology's resource graph
    Deploy(commands::deploy::DeployArgs),

    /// Tear down a deployed topology in reverse creation order
    Destroy(commands::destroy::DestroyArgs),

    /// Show recorded deployments
    Status(commands::status::StatusArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
        } = self;
        let flags = AppFlags {
            json,
            quiet,
            no_color,
        };
        match command {
            Command::Version => commands::version::run(json),
            Command::Deploy(args) => {
                let app = AppContext::new(&flags)?;
                commands::deploy::run(&args, &app).await
            }
            Command::Destroy(args) => {
                let app = AppContext::new(&flags)?;
                commands::destroy::run(&args, &app).await
            }
            Command::Status(args) => {
                let app = AppContext::new(&flags)?;
                commands::status::run(&args, &app).await
            }
        }
    }
}
