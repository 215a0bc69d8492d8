//! Stratus CLI - Dependency-ordered provisioning for small web application stacks

use clap::Parser;

use stratus_cli::cli::Cli;
use stratus_cli::output::json::format_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(e) = cli.run().await {
        // `{e:#}` keeps the context chain, which names the failing node.
        if json {
            match format_error(&format!("{e:#}"), "command_failed") {
                Ok(obj) => eprintln!("{obj}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
