//! Compute units: container specs, start ordering, and health state.
//!
//! A compute unit is the deployable specification: one or more containers,
//! unit-level resource limits, volume declarations, and placement. All
//! declaration-consistency checks (undeclared volume mounts, host-port
//! conflicts, start-order cycles) happen here, before any provisioning call.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigurationError, ReferenceError};
use crate::domain::secret::SecretFieldRef;

/// How containers in a unit attach to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkMode {
    /// Shared host networking; host ports are a single namespace.
    Bridge,
    /// Each unit gets its own network interface; no host-port remapping.
    Vpc,
}

/// Reference to another node's resolved attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrRef {
    /// Producing graph node, e.g. `database`.
    pub node: String,
    /// Attribute name, e.g. `endpoint.host`.
    pub name: String,
}

/// An environment variable value: literal, secret field, or attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    Secret { secret: SecretFieldRef },
    Attribute { attribute: AttrRef },
}

/// A container port, optionally mapped to a host port.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PortMapping {
    pub container_port: u16,
    #[serde(default)]
    pub host_port: Option<u16>,
}

/// A named-volume mount inside a container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Volume name; must be declared on the owning unit.
    pub volume: String,
    pub mount_path: String,
    #[serde(default)]
    pub read_only: bool,
}

/// Container health check, docker-style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub command: Vec<String>,
    #[serde(default = "default_interval")]
    pub interval_secs: u32,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_interval() -> u32 {
    30
}

fn default_retries() -> u32 {
    3
}

/// One container inside a compute unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub env: BTreeMap<String, EnvValue>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default)]
    pub mounts: Vec<VolumeMount>,
    /// Containers that must report healthy before this one starts.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub health_check: Option<HealthCheck>,
}

/// Where a declared volume's data comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeSource {
    /// Backed by a shared-filesystem data tier.
    Filesystem { tier: String },
    /// Unit-local scratch storage.
    Scratch,
}

/// A volume declared on a compute unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub name: String,
    pub source: VolumeSource,
}

fn default_desired_count() -> u32 {
    1
}

/// The deployable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeUnit {
    /// Unit name; also the graph node id.
    pub name: String,
    pub network_mode: NetworkMode,
    /// Subnet group the unit's tasks are placed in.
    pub subnet_group: String,
    #[serde(default = "default_desired_count")]
    pub desired_count: u32,
    pub cpu_units: u32,
    pub memory_mib: u32,
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    pub containers: Vec<ContainerSpec>,
}

impl ComputeUnit {
    /// Find a container by name.
    #[must_use]
    pub fn container(&self, name: &str) -> Option<&ContainerSpec> {
        self.containers.iter().find(|c| c.name == name)
    }

    /// The port ingress targets: the first host-published mapping across the
    /// unit, else the first declared container port.
    #[must_use]
    pub fn exposed_port(&self) -> Option<u16> {
        let mappings = || self.containers.iter().flat_map(|c| c.ports.iter());
        mappings()
            .find_map(|p| p.host_port)
            .or_else(|| mappings().next().map(|p| p.container_port))
    }

    /// Validate declaration-internal consistency: container name uniqueness,
    /// mount declarations, host-port usage, and the start-order DAG.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] or [`ReferenceError`] naming the
    /// offending container; nothing is provisioned when this fails.
    pub fn validate(&self) -> Result<()> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for container in &self.containers {
            if !seen.insert(container.name.as_str()) {
                return Err(
                    ConfigurationError::DuplicateContainer(container.name.clone()).into(),
                );
            }
        }

        let declared_volumes: BTreeSet<&str> =
            self.volumes.iter().map(|v| v.name.as_str()).collect();
        for container in &self.containers {
            for mount in &container.mounts {
                if !declared_volumes.contains(mount.volume.as_str()) {
                    return Err(ConfigurationError::UndeclaredVolume {
                        container: container.name.clone(),
                        volume: mount.volume.clone(),
                    }
                    .into());
                }
            }
        }

        self.validate_ports()?;

        for container in &self.containers {
            for dependency in &container.depends_on {
                if self.container(dependency).is_none() {
                    return Err(ReferenceError::UnknownContainer {
                        container: container.name.clone(),
                        dependency: dependency.clone(),
                    }
                    .into());
                }
            }
        }
        self.start_order()?;

        Ok(())
    }

    fn validate_ports(&self) -> Result<()> {
        match self.network_mode {
            NetworkMode::Bridge => {
                // One host-port namespace per unit: two claims on the same
                // host port cannot both bind.
                let mut claims: BTreeMap<u16, &str> = BTreeMap::new();
                for container in &self.containers {
                    for mapping in &container.ports {
                        let Some(host) = mapping.host_port else {
                            continue;
                        };
                        if let Some(first) = claims.insert(host, container.name.as_str()) {
                            return Err(ConfigurationError::HostPortConflict {
                                port: host,
                                first: first.to_owned(),
                                second: container.name.clone(),
                            }
                            .into());
                        }
                    }
                }
            }
            NetworkMode::Vpc => {
                for container in &self.containers {
                    for mapping in &container.ports {
                        if let Some(host) = mapping.host_port {
                            if host != mapping.container_port {
                                return Err(ConfigurationError::HostPortRemapInVpcMode {
                                    container: container.name.clone(),
                                    host,
                                    container_port: mapping.container_port,
                                }
                                .into());
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Container start order honoring `depends_on`: every container appears
    /// after all of its dependencies. Ties break by declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::StartOrderCycle`] when the declared
    /// dependencies do not form a DAG.
    pub fn start_order(&self) -> Result<Vec<&str>> {
        let mut placed: BTreeSet<&str> = BTreeSet::new();
        let mut order: Vec<&str> = Vec::with_capacity(self.containers.len());

        while order.len() < self.containers.len() {
            let mut progressed = false;
            for container in &self.containers {
                if placed.contains(container.name.as_str()) {
                    continue;
                }
                let ready = container
                    .depends_on
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()));
                if ready {
                    placed.insert(container.name.as_str());
                    order.push(container.name.as_str());
                    progressed = true;
                }
            }
            if !progressed {
                let stuck = self
                    .containers
                    .iter()
                    .find(|c| !placed.contains(c.name.as_str()))
                    .map_or_else(String::new, |c| c.name.clone());
                return Err(ConfigurationError::StartOrderCycle(stuck).into());
            }
        }
        Ok(order)
    }
}

// ── Container health state ────────────────────────────────────────────────────

/// Per-container health state. Explicit tagged state, no polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerHealth {
    Pending,
    Healthy,
    Failed,
}

/// Health of every container in one unit, keyed by container name.
#[derive(Debug, Clone)]
pub struct UnitHealth {
    states: BTreeMap<String, ContainerHealth>,
}

impl UnitHealth {
    /// All containers start `Pending`.
    #[must_use]
    pub fn new(unit: &ComputeUnit) -> Self {
        Self {
            states: unit
                .containers
                .iter()
                .map(|c| (c.name.clone(), ContainerHealth::Pending))
                .collect(),
        }
    }

    /// Current state of one container; unknown names read as `Failed`.
    #[must_use]
    pub fn state(&self, container: &str) -> ContainerHealth {
        self.states
            .get(container)
            .copied()
            .unwrap_or(ContainerHealth::Failed)
    }

    /// Transition `Pending -> Healthy`. Returns `false` if the container was
    /// not pending (terminal states never change).
    pub fn mark_healthy(&mut self, container: &str) -> bool {
        match self.states.get_mut(container) {
            Some(state) if *state == ContainerHealth::Pending => {
                *state = ContainerHealth::Healthy;
                true
            }
            _ => false,
        }
    }

    /// Transition `Pending -> Failed`. Returns `false` if not pending.
    pub fn mark_failed(&mut self, container: &str) -> bool {
        match self.states.get_mut(container) {
            Some(state) if *state == ContainerHealth::Pending => {
                *state = ContainerHealth::Failed;
                true
            }
            _ => false,
        }
    }

    /// A container is ready when it is healthy and every start-order
    /// dependency is ready in turn.
    #[must_use]
    pub fn is_ready(&self, unit: &ComputeUnit, container: &str) -> bool {
        let Some(spec) = unit.container(container) else {
            return false;
        };
        if self.state(container) != ContainerHealth::Healthy {
            return false;
        }
        spec.depends_on.iter().all(|dep| self.is_ready(unit, dep))
    }

    /// Whether every container in the unit is ready.
    #[must_use]
    pub fn all_ready(&self, unit: &ComputeUnit) -> bool {
        unit.containers.iter().all(|c| self.is_ready(unit, &c.name))
    }

    /// Whether a container may start: every direct dependency is healthy.
    #[must_use]
    pub fn can_start(&self, unit: &ComputeUnit, container: &str) -> bool {
        unit.container(container).is_some_and(|spec| {
            spec.depends_on
                .iter()
                .all(|dep| self.state(dep) == ContainerHealth::Healthy)
        })
    }
}
