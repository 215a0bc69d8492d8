//! Persisted deployment records.
//!
//! One record per deployed topology, listing realized nodes in realization
//! order. `destroy` walks the list in reverse; a partially failed deploy or
//! destroy saves the record so already-realized nodes stay accounted for.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::graph::NodeKind;

/// A node the control plane has realized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedNode {
    pub node: String,
    pub kind: NodeKind,
    /// Control-plane handle used for deletion.
    pub handle: String,
    /// Teardown policy `retain`: skip deletion on destroy.
    #[serde(default)]
    pub retain: bool,
    /// Attributes the control plane resolved at creation.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// The record persisted to `deployments/<topology>.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub topology: String,
    pub deployed_at: DateTime<Utc>,
    /// Public entry point, surfaced after a successful deploy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_address: Option<String>,
    /// Realized nodes in realization order.
    #[serde(default)]
    pub nodes: Vec<RealizedNode>,
}

impl DeploymentRecord {
    /// Start an empty record stamped with the current time.
    #[must_use]
    pub fn new(topology: &str) -> Self {
        Self {
            topology: topology.to_owned(),
            deployed_at: Utc::now(),
            ingress_address: None,
            nodes: Vec::new(),
        }
    }

    /// Append a realized node.
    pub fn push(&mut self, node: RealizedNode) {
        self.nodes.push(node);
    }
}
