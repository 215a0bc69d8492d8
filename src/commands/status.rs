//! `stratus status` — show recorded deployments.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::DeploymentStore as _;
use crate::domain::record::DeploymentRecord;
use crate::output::OutputContext;

/// Arguments for the status command.
#[derive(Args)]
pub struct StatusArgs {
    /// Topology to inspect; omit to list all recorded deployments
    pub topology: Option<String>,
}

/// Run `stratus status`.
///
/// # Errors
///
/// Returns an error if the record store cannot be read.
pub async fn run(args: &StatusArgs, app: &AppContext) -> Result<()> {
    match &args.topology {
        Some(topology) => show_one(topology, app).await,
        None => list_all(app),
    }
}

async fn show_one(topology: &str, app: &AppContext) -> Result<()> {
    let record = app.store.load(topology).await?;

    if app.is_json() {
        let obj = match &record {
            Some(r) => serde_json::json!({
                "topology": topology,
                "deployed": true,
                "deployed_at": r.deployed_at,
                "ingress_address": r.ingress_address,
                "nodes": r.nodes,
            }),
            None => serde_json::json!({ "topology": topology, "deployed": false }),
        };
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    match record {
        Some(r) => print_record(&r, &app.output),
        None => {
            app.output
                .info(&format!("Topology '{topology}' is not deployed."));
            app.output
                .kv("Deploy", &format!("stratus deploy {topology}"));
        }
    }
    Ok(())
}

fn list_all(app: &AppContext) -> Result<()> {
    let names = app.store.list()?;

    if app.is_json() {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "deployments": names }))?
        );
        return Ok(());
    }

    if names.is_empty() {
        app.output.info("No recorded deployments.");
        app.output.kv("Deploy", "stratus deploy cms-serverless");
    } else {
        app.output.header("Deployments:");
        for name in names {
            app.output.kv(&name, &format!("stratus status {name}"));
        }
    }
    Ok(())
}

fn print_record(record: &DeploymentRecord, ctx: &OutputContext) {
    ctx.header(&format!("Deployment: {}", record.topology));
    ctx.kv("Deployed at", &record.deployed_at.to_rfc3339());
    if let Some(address) = &record.ingress_address {
        ctx.kv("Ingress", address);
    }
    println!();
    ctx.header("Nodes (creation order):");
    for node in &record.nodes {
        let detail = if node.retain {
            format!("{} · {} · retain", node.kind, node.handle)
        } else {
            format!("{} · {}", node.kind, node.handle)
        };
        ctx.kv(&node.node, &detail);
    }
}
