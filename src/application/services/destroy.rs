//! Application service — destroy use-case.
//!
//! Tears down every recorded resource in exact reverse realization order.
//! Tiers marked `retain` are skipped but dropped from the record; a failing
//! delete saves the remaining record so a retry picks up where this stopped.

use anyhow::Result;

use crate::application::ports::{CloudProvider, DeploymentStore, ProgressReporter};
use crate::domain::descriptor::validate_name;

/// Outcome of a successful destroy.
#[derive(Debug)]
pub struct DestroyOutcome {
    pub topology: String,
    pub nodes_deleted: usize,
    /// Nodes left in place by their teardown policy.
    pub nodes_retained: usize,
}

/// Destroy a recorded deployment.
///
/// # Errors
///
/// Returns an error when no deployment is recorded for `topology`, or the
/// failing node's deletion error with its name in the context chain.
pub async fn destroy_stack(
    provider: &impl CloudProvider,
    store: &impl DeploymentStore,
    reporter: &impl ProgressReporter,
    topology: &str,
) -> Result<DestroyOutcome> {
    validate_name(topology)?;
    let Some(record) = store.load(topology).await? else {
        anyhow::bail!("no recorded deployment for '{topology}'");
    };

    let mut remaining = record.clone();
    let mut deleted = 0usize;
    let mut retained = 0usize;

    for node in record.nodes.iter().rev() {
        if node.retain {
            reporter.warn(&format!(
                "retaining {} '{}' (teardown policy)",
                node.kind, node.node
            ));
            retained += 1;
            remaining.nodes.retain(|n| n.node != node.node);
            continue;
        }
        reporter.step(&format!("deleting {} '{}'...", node.kind, node.node));
        match provider.delete(&node.handle).await {
            Ok(()) => {
                deleted += 1;
                remaining.nodes.retain(|n| n.node != node.node);
            }
            Err(err) => {
                store.save(&remaining).await?;
                return Err(err.context(format!("deleting node '{}'", node.node)));
            }
        }
    }

    store.remove(topology).await?;
    reporter.success(&format!("destroyed '{topology}' ({deleted} nodes)"));

    Ok(DestroyOutcome {
        topology: topology.to_owned(),
        nodes_deleted: deleted,
        nodes_retained: retained,
    })
}
