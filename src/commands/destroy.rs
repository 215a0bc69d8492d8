//! `stratus destroy` — tear down a deployed topology in reverse order.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::destroy as service;

/// Arguments for the destroy command.
#[derive(Args)]
pub struct DestroyArgs {
    /// Topology whose recorded deployment is torn down
    pub topology: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

/// Run `stratus destroy`.
///
/// # Errors
///
/// Returns an error when no deployment is recorded for the topology or a
/// node fails to release.
pub async fn run(args: &DestroyArgs, app: &AppContext) -> Result<()> {
    if !app.output.quiet && !app.is_json() {
        println!();
        println!(
            "This will release all recorded resources of '{}' in reverse creation order.",
            args.topology
        );
        println!("Tiers with a 'retain' teardown policy are kept.");
        println!();
    }

    if !args.yes && !app.confirm("Continue?", false)? {
        println!("Cancelled.");
        return Ok(());
    }

    let outcome = {
        let reporter = app.terminal_reporter();
        service::destroy_stack(&app.provider, &app.store, &reporter, &args.topology).await?
    };

    if app.is_json() {
        let obj = serde_json::json!({
            "topology": outcome.topology,
            "nodes_deleted": outcome.nodes_deleted,
            "nodes_retained": outcome.nodes_retained,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    if !app.output.quiet {
        app.output.success(&format!(
            "Topology '{}' destroyed ({} nodes released, {} retained).",
            outcome.topology, outcome.nodes_deleted, outcome.nodes_retained
        ));
        app.output
            .kv("Redeploy", &format!("stratus deploy {}", outcome.topology));
    }
    Ok(())
}
