//! Stack composition: from a topology descriptor to a realizable graph.
//!
//! `Stack::compose` is the single composer both topology variants go
//! through. It allocates the network, derives the node set and dependency
//! edges, declares every node's attribute cells, and runs all
//! declaration-time validation. Nothing here touches a control plane; a
//! composed stack is rendered node by node into provider payloads during
//! realization.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde_json::{Value, json};

use crate::domain::attribute::Attribute;
use crate::domain::compute::{ComputeUnit, EnvValue, VolumeSource};
use crate::domain::data_tier::DataTierSpec;
use crate::domain::descriptor::{TopologyDescriptor, validate_name};
use crate::domain::error::{ConfigurationError, ReferenceError};
use crate::domain::graph::{CompositionGraph, NodeKind};
use crate::domain::ingress::IngressSpec;
use crate::domain::network::{NetworkTopology, ReachabilityClass, SubnetGroup};
use crate::domain::secret::KNOWN_SECRET_FIELDS;
use crate::domain::security::{Direction, Peer, Protocol, SecurityBoundary, SecurityRule};
use crate::domain::wiring;

/// Node id of the virtual network.
pub const NETWORK_NODE: &str = "network";
/// Node id of the public entry point.
pub const INGRESS_NODE: &str = "ingress";
/// Node id of the final reachability-wiring stage.
pub const WIRING_NODE: &str = "wiring";

/// Node id of the security boundary owned by `owner`.
#[must_use]
pub fn boundary_node(owner: &str) -> String {
    format!("{owner}-boundary")
}

/// Node id of the credential secret generated for a relational tier.
#[must_use]
pub fn secret_node(tier: &str) -> String {
    format!("{tier}-credentials")
}

/// A composed, validated stack ready for realization.
#[derive(Debug)]
pub struct Stack {
    pub name: String,
    pub network: NetworkTopology,
    pub descriptor: TopologyDescriptor,
    pub graph: CompositionGraph,
    attributes: BTreeMap<String, BTreeMap<String, Attribute>>,
}

impl Stack {
    /// Build the composition graph for a descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] or [`ReferenceError`] for any
    /// declaration inconsistency. No provisioning has happened when this
    /// fails.
    pub fn compose(descriptor: &TopologyDescriptor) -> Result<Self> {
        validate_name(&descriptor.name)?;
        let network = NetworkTopology::allocate(&descriptor.network)?;

        let mut stack = Self {
            name: descriptor.name.clone(),
            network,
            descriptor: descriptor.clone(),
            graph: CompositionGraph::new(),
            attributes: BTreeMap::new(),
        };

        stack.add_node(NETWORK_NODE, NodeKind::Network, vec![], &["network.id"])?;
        for tier in &descriptor.data_tiers {
            stack.add_tier(tier)?;
        }
        for unit in &descriptor.compute_units {
            stack.add_unit(unit)?;
        }
        if let Some(ingress) = &descriptor.ingress {
            stack.add_ingress(ingress)?;
        }

        // The wiring stage runs strictly after every other node.
        let all: Vec<String> = stack.graph.nodes().iter().map(|n| n.id.clone()).collect();
        stack.add_node(WIRING_NODE, NodeKind::Wiring, all, &[])?;

        Ok(stack)
    }

    fn add_node(
        &mut self,
        id: &str,
        kind: NodeKind,
        depends_on: Vec<String>,
        attrs: &[&str],
    ) -> Result<()> {
        self.graph.add(id, kind, depends_on)?;
        let cells: BTreeMap<String, Attribute> = attrs
            .iter()
            .map(|name| ((*name).to_owned(), Attribute::pending(id, name)))
            .collect();
        self.attributes.insert(id.to_owned(), cells);
        Ok(())
    }

    fn placement(&self, group: &str) -> Result<&SubnetGroup> {
        let Some(found) = self.network.group(group) else {
            return Err(ConfigurationError::UnknownSubnetGroup(group.to_owned()).into());
        };
        Ok(found)
    }

    fn add_tier(&mut self, tier: &DataTierSpec) -> Result<()> {
        validate_name(&tier.name)?;
        tier.validate()?;
        let group = self.placement(&tier.subnet_group)?;
        if group.class == ReachabilityClass::Public {
            return Err(ConfigurationError::PublicDataTier {
                name: tier.name.clone(),
                group: tier.subnet_group.clone(),
            }
            .into());
        }

        let boundary = boundary_node(&tier.name);
        self.add_node(
            &boundary,
            NodeKind::SecurityBoundary,
            vec![NETWORK_NODE.to_owned()],
            &["boundary.id"],
        )?;

        let mut attrs = vec!["endpoint.host", "endpoint.port"];
        if tier.access_point_root().is_some() {
            attrs.push("access_point.id");
        }
        self.add_node(
            &tier.name,
            NodeKind::DataTier,
            vec![NETWORK_NODE.to_owned(), boundary],
            &attrs,
        )?;

        // The credential secret is created alongside the tier, after it.
        if tier.is_relational() {
            self.add_node(
                &secret_node(&tier.name),
                NodeKind::Secret,
                vec![tier.name.clone()],
                &["secret.arn"],
            )?;
        }
        Ok(())
    }

    fn add_unit(&mut self, unit: &ComputeUnit) -> Result<()> {
        validate_name(&unit.name)?;
        unit.validate()?;
        self.placement(&unit.subnet_group)?;

        let boundary = boundary_node(&unit.name);
        let mut deps: BTreeSet<String> = BTreeSet::new();
        deps.insert(NETWORK_NODE.to_owned());

        for container in &unit.containers {
            for value in container.env.values() {
                match value {
                    EnvValue::Literal(_) => {}
                    EnvValue::Secret { secret } => {
                        secret.validate()?;
                        let Some(tier) = self.tier(&secret.from) else {
                            return Err(ReferenceError::UnknownNode(secret.from.clone()).into());
                        };
                        if !tier.is_relational() {
                            return Err(ReferenceError::NoSecretForTier {
                                from: secret.from.clone(),
                            }
                            .into());
                        }
                        deps.insert(secret_node(&secret.from));
                    }
                    EnvValue::Attribute { attribute } => {
                        let Some(cells) = self.attributes.get(&attribute.node) else {
                            return Err(
                                ReferenceError::UnknownNode(attribute.node.clone()).into()
                            );
                        };
                        if !cells.contains_key(&attribute.name) {
                            return Err(ReferenceError::UnknownAttribute {
                                node: attribute.node.clone(),
                                attribute: attribute.name.clone(),
                            }
                            .into());
                        }
                        deps.insert(attribute.node.clone());
                    }
                }
            }
        }

        for volume in &unit.volumes {
            if let VolumeSource::Filesystem { tier } = &volume.source {
                let Some(spec) = self.tier(tier) else {
                    return Err(ReferenceError::UnknownNode(tier.clone()).into());
                };
                if spec.is_relational() {
                    return Err(ConfigurationError::VolumeSourceNotFilesystem {
                        volume: volume.name.clone(),
                        tier: tier.clone(),
                    }
                    .into());
                }
                deps.insert(tier.clone());
            }
        }

        self.add_node(
            &boundary,
            NodeKind::SecurityBoundary,
            vec![NETWORK_NODE.to_owned()],
            &["boundary.id"],
        )?;
        deps.insert(boundary);

        self.add_node(
            &unit.name,
            NodeKind::ComputeService,
            deps.into_iter().collect(),
            &["service.id", "service.start_order"],
        )?;
        Ok(())
    }

    fn add_ingress(&mut self, ingress: &IngressSpec) -> Result<()> {
        let Some(unit) = self.unit(&ingress.unit) else {
            return Err(ReferenceError::UnknownNode(ingress.unit.clone()).into());
        };
        if unit.exposed_port().is_none() {
            return Err(ConfigurationError::NoExposedPort(ingress.unit.clone()).into());
        }

        let boundary = boundary_node(INGRESS_NODE);
        self.add_node(
            &boundary,
            NodeKind::SecurityBoundary,
            vec![NETWORK_NODE.to_owned()],
            &["boundary.id"],
        )?;
        self.add_node(
            INGRESS_NODE,
            NodeKind::Ingress,
            vec![NETWORK_NODE.to_owned(), boundary, ingress.unit.clone()],
            &["address"],
        )?;
        Ok(())
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    /// Data tier spec by name.
    #[must_use]
    pub fn tier(&self, name: &str) -> Option<&DataTierSpec> {
        self.descriptor.data_tiers.iter().find(|t| t.name == name)
    }

    /// Compute unit spec by name.
    #[must_use]
    pub fn unit(&self, name: &str) -> Option<&ComputeUnit> {
        self.descriptor.compute_units.iter().find(|u| u.name == name)
    }

    /// Read a resolved attribute of a node.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceError`] when the node or attribute is not
    /// declared, or the producer has not been realized yet.
    pub fn attribute(&self, node: &str, name: &str) -> Result<String> {
        let Some(cells) = self.attributes.get(node) else {
            return Err(ReferenceError::UnknownNode(node.to_owned()).into());
        };
        let Some(cell) = cells.get(name) else {
            return Err(ReferenceError::UnknownAttribute {
                node: node.to_owned(),
                attribute: name.to_owned(),
            }
            .into());
        };
        cell.get()
    }

    /// Resolve a node's declared attribute cells from control-plane output.
    /// Keys outside the declared set are ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceError`] for an undeclared node or a repeated
    /// resolution.
    pub fn resolve_attributes(&self, node: &str, values: &BTreeMap<String, String>) -> Result<()> {
        let Some(cells) = self.attributes.get(node) else {
            return Err(ReferenceError::UnknownNode(node.to_owned()).into());
        };
        for (name, cell) in cells {
            if let Some(value) = values.get(name) {
                cell.resolve(value.clone())?;
            }
        }
        Ok(())
    }

    // ── Provider payload rendering ───────────────────────────────────────────

    /// Render the control-plane payload for one node.
    ///
    /// Payloads that embed producer attributes (compute environment, ingress
    /// target) require those producers to be realized; the realization order
    /// guarantees it.
    ///
    /// # Errors
    ///
    /// Returns a [`ReferenceError`] when a consumed attribute is unresolved,
    /// which indicates a missing dependency edge.
    pub fn provider_payload(&self, node_id: &str) -> Result<Value> {
        let Some(node) = self.graph.get(node_id) else {
            return Err(ReferenceError::UnknownNode(node_id.to_owned()).into());
        };
        match node.kind {
            NodeKind::Network => Ok(serde_json::to_value(&self.network)?),
            NodeKind::SecurityBoundary => {
                Ok(serde_json::to_value(self.initial_boundary(node_id))?)
            }
            NodeKind::DataTier => self.tier_payload(node_id),
            NodeKind::Secret => {
                // A secret node's sole dependency is its owning tier.
                let tier = node.depends_on.first().cloned().unwrap_or_default();
                Ok(json!({ "tier": tier, "fields": KNOWN_SECRET_FIELDS }))
            }
            NodeKind::ComputeService => {
                let Some(unit) = self.unit(node_id) else {
                    return Err(ReferenceError::UnknownNode(node_id.to_owned()).into());
                };
                self.unit_payload(unit)
            }
            NodeKind::Ingress => self.ingress_payload(),
            NodeKind::Wiring => {
                let grants: Vec<Value> = wiring::derive_grants(self)
                    .iter()
                    .map(|g| {
                        json!({
                            "consumer": g.consumer,
                            "producer": g.producer,
                            "port": g.port,
                            "consumer_boundary": boundary_node(&g.consumer),
                            "producer_boundary": boundary_node(&g.producer),
                        })
                    })
                    .collect();
                Ok(json!({ "grants": grants }))
            }
        }
    }

    fn tier_payload(&self, node_id: &str) -> Result<Value> {
        let Some(tier) = self.tier(node_id) else {
            return Err(ReferenceError::UnknownNode(node_id.to_owned()).into());
        };
        let group = self.placement(&tier.subnet_group)?;
        Ok(json!({
            "tier": serde_json::to_value(tier)?,
            "subnet_cidr": group.cidr.to_string(),
            "port": tier.port(),
        }))
    }

    fn unit_payload(&self, unit: &ComputeUnit) -> Result<Value> {
        let start_order: Vec<String> = unit
            .start_order()?
            .into_iter()
            .map(str::to_owned)
            .collect();

        let mut containers: Vec<Value> = Vec::with_capacity(unit.containers.len());
        for container in &unit.containers {
            let mut env = serde_json::Map::new();
            for (key, value) in &container.env {
                let bound = match value {
                    EnvValue::Literal(v) => json!({ "value": v }),
                    EnvValue::Attribute { attribute } => {
                        json!({ "value": self.attribute(&attribute.node, &attribute.name)? })
                    }
                    // The reference stays opaque: the runtime gets the secret
                    // handle and field, never a plaintext value.
                    EnvValue::Secret { secret } => json!({
                        "secret": {
                            "source": self.attribute(&secret_node(&secret.from), "secret.arn")?,
                            "field": secret.field,
                        }
                    }),
                };
                env.insert(key.clone(), bound);
            }
            containers.push(json!({
                "name": container.name,
                "image": container.image,
                "depends_on": container.depends_on,
                "ports": serde_json::to_value(&container.ports)?,
                "env": env,
                "mounts": serde_json::to_value(&container.mounts)?,
                "health_check": serde_json::to_value(&container.health_check)?,
            }));
        }

        let mut volumes: Vec<Value> = Vec::with_capacity(unit.volumes.len());
        for volume in &unit.volumes {
            let source = match &volume.source {
                VolumeSource::Scratch => json!("scratch"),
                VolumeSource::Filesystem { tier } => {
                    let Some(spec) = self.tier(tier) else {
                        return Err(ReferenceError::UnknownNode(tier.clone()).into());
                    };
                    let access_point = if spec.access_point_root().is_some() {
                        Some(self.attribute(tier, "access_point.id")?)
                    } else {
                        None
                    };
                    json!({
                        "filesystem": {
                            "host": self.attribute(tier, "endpoint.host")?,
                            "port": spec.port(),
                            "access_point": access_point,
                        }
                    })
                }
            };
            volumes.push(json!({ "name": volume.name, "source": source }));
        }

        Ok(json!({
            "name": unit.name,
            "network_mode": serde_json::to_value(unit.network_mode)?,
            "subnet_group": unit.subnet_group,
            "desired_count": unit.desired_count,
            "cpu_units": unit.cpu_units,
            "memory_mib": unit.memory_mib,
            "start_order": start_order,
            "containers": containers,
            "volumes": volumes,
        }))
    }

    fn ingress_payload(&self) -> Result<Value> {
        let Some(spec) = &self.descriptor.ingress else {
            return Err(ReferenceError::UnknownNode(INGRESS_NODE.to_owned()).into());
        };
        let Some(unit) = self.unit(&spec.unit) else {
            return Err(ReferenceError::UnknownNode(spec.unit.clone()).into());
        };
        let Some(port) = unit.exposed_port() else {
            return Err(ConfigurationError::NoExposedPort(spec.unit.clone()).into());
        };

        // Default to the declared health check of the container exposing the
        // target port, falling back to a plain TCP reachability probe.
        let declared = unit
            .containers
            .iter()
            .find(|c| {
                c.ports
                    .iter()
                    .any(|p| p.host_port.unwrap_or(p.container_port) == port)
            })
            .and_then(|c| c.health_check.as_ref());
        let health_check = match declared {
            Some(check) => serde_json::to_value(check)?,
            None => json!({ "tcp": port }),
        };

        Ok(json!({
            "listener_port": spec.listener_port,
            "protocol": serde_json::to_value(spec.protocol)?,
            "public": spec.public,
            "target": {
                "service": self.attribute(&spec.unit, "service.id")?,
                "port": port,
                "health_check": health_check,
            },
        }))
    }

    fn initial_boundary(&self, node_id: &str) -> SecurityBoundary {
        let mut boundary = SecurityBoundary::new(node_id);
        let owner = node_id.strip_suffix("-boundary").unwrap_or(node_id);

        if owner == INGRESS_NODE {
            if let Some(ingress) = &self.descriptor.ingress {
                if ingress.public {
                    boundary.allow(SecurityRule {
                        direction: Direction::Ingress,
                        protocol: Protocol::Tcp,
                        port: Some(ingress.listener_port),
                        peer: Peer::Cidr("0.0.0.0/0".to_owned()),
                    });
                }
            }
        } else if self.unit(owner).is_some() {
            // Compute units egress freely (image pulls, upstream calls);
            // tier boundaries stay default-deny until wiring grants arrive.
            boundary.allow(SecurityRule {
                direction: Direction::Egress,
                protocol: Protocol::Tcp,
                port: None,
                peer: Peer::Cidr("0.0.0.0/0".to_owned()),
            });
        }
        boundary
    }
}
