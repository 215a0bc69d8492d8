//! The resource composition graph and its realization order.
//!
//! Nodes are resource declarations; edges say "must be realized before".
//! Dependencies must already be declared when a node is added, which keeps
//! the builder honest about ordering. The realization order is a topological
//! sort computed with Kahn's algorithm, with declaration order breaking ties
//! so a given declaration always realizes the same way.

use std::collections::BTreeSet;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigurationError, ReferenceError};

/// What kind of resource a graph node declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Network,
    SecurityBoundary,
    DataTier,
    Secret,
    ComputeService,
    Ingress,
    Wiring,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Network => "network",
            Self::SecurityBoundary => "security boundary",
            Self::DataTier => "data tier",
            Self::Secret => "secret",
            Self::ComputeService => "compute service",
            Self::Ingress => "ingress",
            Self::Wiring => "reachability wiring",
        };
        f.write_str(s)
    }
}

/// One declared resource and its dependency edges.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub depends_on: Vec<String>,
}

/// The composition DAG.
#[derive(Debug, Clone, Default)]
pub struct CompositionGraph {
    nodes: Vec<Node>,
}

impl CompositionGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node. Every dependency must already be declared.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DuplicateNode`] for a repeated id and
    /// [`ReferenceError::UnknownNode`] for a dependency on an undeclared node.
    pub fn add(&mut self, id: &str, kind: NodeKind, depends_on: Vec<String>) -> Result<()> {
        if self.get(id).is_some() {
            return Err(ConfigurationError::DuplicateNode(id.to_owned()).into());
        }
        for dep in &depends_on {
            if self.get(dep).is_none() {
                return Err(ReferenceError::UnknownNode(dep.clone()).into());
            }
        }
        self.nodes.push(Node {
            id: id.to_owned(),
            kind,
            depends_on,
        });
        Ok(())
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of declared nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Compute the realization order: every node appears after all of its
    /// dependencies, and ties break by declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::DependencyCycle`] when no valid order
    /// exists. `add()` makes cycles unrepresentable, so hitting this means
    /// the graph was assembled some other way.
    pub fn realization_order(&self) -> Result<Vec<&Node>> {
        let mut placed: BTreeSet<&str> = BTreeSet::new();
        let mut order: Vec<&Node> = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let mut progressed = false;
            for node in &self.nodes {
                if placed.contains(node.id.as_str()) {
                    continue;
                }
                let ready = node
                    .depends_on
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()));
                if ready {
                    placed.insert(node.id.as_str());
                    order.push(node);
                    progressed = true;
                }
            }
            if !progressed {
                let stuck = self
                    .nodes
                    .iter()
                    .find(|n| !placed.contains(n.id.as_str()))
                    .map_or_else(String::new, |n| n.id.clone());
                return Err(ConfigurationError::DependencyCycle(stuck).into());
            }
        }
        Ok(order)
    }
}
