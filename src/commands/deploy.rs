//! `stratus deploy` — realize a topology's resource graph.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::deploy as service;
use crate::domain::descriptor::TopologyDescriptor;
use crate::infra::assets;
use crate::output::OutputContext;

/// Arguments for the deploy command.
#[derive(Args)]
pub struct DeployArgs {
    /// Built-in topology to deploy (cms-bridge, cms-serverless)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub topology: Option<String>,

    /// Deploy a descriptor file instead of a built-in topology
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

/// Run `stratus deploy`.
///
/// # Errors
///
/// Returns an error when the descriptor is inconsistent (before any
/// provisioning) or a node fails to provision (named in the error chain).
pub async fn run(args: &DeployArgs, app: &AppContext) -> Result<()> {
    let descriptor = load_descriptor(args)?;
    let outcome = {
        let reporter = app.terminal_reporter();
        service::deploy_stack(&app.provider, &app.store, &reporter, &descriptor).await?
    };

    if app.is_json() {
        let obj = serde_json::json!({
            "topology": outcome.topology,
            "nodes_created": outcome.nodes_created,
            "ingress_address": outcome.ingress_address,
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    print_success_message(&outcome, &app.output);
    Ok(())
}

fn load_descriptor(args: &DeployArgs) -> Result<TopologyDescriptor> {
    let text = match (&args.file, &args.topology) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("reading descriptor {}", path.display()))?,
        (None, Some(name)) => assets::builtin_topology(name)?.to_owned(),
        (None, None) => anyhow::bail!("a topology name or --file is required"),
    };
    TopologyDescriptor::from_yaml(&text)
}

/// Print success message after the graph is realized.
fn print_success_message(outcome: &service::DeployOutcome, ctx: &OutputContext) {
    if ctx.quiet {
        return;
    }
    ctx.success(&format!(
        "Topology '{}' deployed ({} nodes).",
        outcome.topology, outcome.nodes_created
    ));
    if let Some(address) = &outcome.ingress_address {
        ctx.kv("Ingress", address);
    }
    ctx.kv("Status", &format!("stratus status {}", outcome.topology));
    ctx.kv("Destroy", &format!("stratus destroy {}", outcome.topology));
}
