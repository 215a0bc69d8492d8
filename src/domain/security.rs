//! Security boundaries and additive traffic rules.
//!
//! Rules are additive only: there is no explicit deny, and the absence of a
//! rule means default-deny. Declaring the same rule twice yields exactly one
//! effective rule.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Traffic direction of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Ingress,
    Egress,
}

/// Protocol a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// The peer a rule permits traffic to or from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Peer {
    /// A CIDR range, e.g. `0.0.0.0/0`.
    Cidr(String),
    /// Another named security boundary.
    Boundary(String),
}

/// One permitted traffic flow. `port: None` permits all ports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityRule {
    pub direction: Direction,
    pub protocol: Protocol,
    pub port: Option<u16>,
    pub peer: Peer,
}

/// A named boundary holding its effective rule set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityBoundary {
    name: String,
    rules: BTreeSet<SecurityRule>,
}

impl SecurityBoundary {
    /// Create an empty (default-deny) boundary.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            rules: BTreeSet::new(),
        }
    }

    /// Boundary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a rule. Returns `false` when an identical rule was already present.
    pub fn allow(&mut self, rule: SecurityRule) -> bool {
        self.rules.insert(rule)
    }

    /// Effective rules in stable order.
    pub fn rules(&self) -> impl Iterator<Item = &SecurityRule> {
        self.rules.iter()
    }

    /// Number of effective rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the boundary is default-deny with no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
