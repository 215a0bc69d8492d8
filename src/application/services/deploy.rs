//! Application service — deploy use-case.
//!
//! Composes the stack, realizes nodes in topological order through the
//! control-plane port, and persists the deployment record. All declaration
//! errors surface before the first control-plane call; a failing node aborts
//! the remainder and leaves realized nodes recorded for a later retry.

use anyhow::Result;

use crate::application::ports::{CloudProvider, CreateRequest, DeploymentStore, ProgressReporter};
use crate::domain::compute::{ComputeUnit, UnitHealth};
use crate::domain::data_tier::TeardownPolicy;
use crate::domain::descriptor::TopologyDescriptor;
use crate::domain::graph::NodeKind;
use crate::domain::record::{DeploymentRecord, RealizedNode};
use crate::domain::stack::{INGRESS_NODE, Stack};

/// Outcome of a successful deploy.
#[derive(Debug)]
pub struct DeployOutcome {
    pub topology: String,
    pub nodes_created: usize,
    /// Public entry point, when the topology declares an ingress.
    pub ingress_address: Option<String>,
}

/// Deploy a topology descriptor.
///
/// # Errors
///
/// Returns a `ConfigurationError` or `ReferenceError` before any
/// control-plane call for an inconsistent declaration, or the failing
/// node's provisioning error with its name in the context chain.
pub async fn deploy_stack(
    provider: &impl CloudProvider,
    store: &impl DeploymentStore,
    reporter: &impl ProgressReporter,
    descriptor: &TopologyDescriptor,
) -> Result<DeployOutcome> {
    let stack = Stack::compose(descriptor)?;
    let order = stack.graph.realization_order()?;

    let mut record = DeploymentRecord::new(&stack.name);
    for node in order {
        reporter.step(&format!("creating {} '{}'...", node.kind, node.id));
        let payload = stack.provider_payload(&node.id)?;
        let request = CreateRequest {
            topology: stack.name.clone(),
            node: node.id.clone(),
            kind: node.kind,
            payload,
        };
        match provider.create(&request).await {
            Ok(created) => {
                stack.resolve_attributes(&node.id, &created.attributes)?;
                if node.kind == NodeKind::ComputeService {
                    if let Some(unit) = stack.unit(&node.id) {
                        confirm_rollout(unit, reporter)?;
                    }
                }
                let retain = stack
                    .tier(&node.id)
                    .is_some_and(|t| t.teardown == TeardownPolicy::Retain);
                record.push(RealizedNode {
                    node: node.id.clone(),
                    kind: node.kind,
                    handle: created.handle,
                    retain,
                    attributes: created.attributes,
                });
            }
            Err(err) => {
                // Keep already-realized nodes recorded for a later resume.
                if !record.nodes.is_empty() {
                    store.save(&record).await?;
                }
                return Err(err.context(format!("provisioning node '{}'", node.id)));
            }
        }
    }

    record.ingress_address = stack.attribute(INGRESS_NODE, "address").ok();
    store.save(&record).await?;
    reporter.success(&format!(
        "deployed '{}' ({} nodes)",
        stack.name,
        record.nodes.len()
    ));

    Ok(DeployOutcome {
        topology: stack.name,
        nodes_created: record.nodes.len(),
        ingress_address: record.ingress_address,
    })
}

/// Model the unit's rollout: containers report healthy in start order, and a
/// container with start-after dependencies is not ready until every
/// dependency is healthy.
fn confirm_rollout(unit: &ComputeUnit, reporter: &impl ProgressReporter) -> Result<()> {
    let mut health = UnitHealth::new(unit);
    for name in unit.start_order()? {
        anyhow::ensure!(
            health.can_start(unit, name),
            "container '{name}' started before its dependencies were healthy"
        );
        health.mark_healthy(name);
        reporter.step(&format!("container '{name}' healthy"));
    }
    anyhow::ensure!(
        health.all_ready(unit),
        "unit '{}' did not become ready",
        unit.name
    );
    Ok(())
}
