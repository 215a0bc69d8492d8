//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.
//!
//! The split matters for callers: `ConfigurationError` and `ReferenceError`
//! are detected at graph-build time, before any control-plane call, and are
//! never retried. `ProvisioningError` is surfaced per node at realization.

use thiserror::Error;

// ── Configuration errors ──────────────────────────────────────────────────────

/// The declaration is internally inconsistent. Detected before provisioning.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid CIDR block '{0}'")]
    InvalidCidr(String),

    #[error("address space exhausted: {requested} subnet groups do not fit in {cidr}")]
    AddressSpaceExhausted { cidr: String, requested: usize },

    #[error("subnet group '{0}' declared twice")]
    DuplicateSubnetGroup(String),

    #[error("subnet group '{0}' is private-isolated and cannot request a NAT route")]
    NatOnIsolatedGroup(String),

    #[error("subnet group '{0}' is not declared in the network topology")]
    UnknownSubnetGroup(String),

    #[error("data tier '{name}' cannot be placed in public subnet group '{group}'")]
    PublicDataTier { name: String, group: String },

    #[error("capacity bounds invalid for '{name}': min {min} exceeds max {max}")]
    CapacityBounds { name: String, min: u32, max: u32 },

    #[error("container start-order cycle involving '{0}'")]
    StartOrderCycle(String),

    #[error("container '{container}' mounts undeclared volume '{volume}'")]
    UndeclaredVolume { container: String, volume: String },

    #[error("host port {port} claimed by both '{first}' and '{second}'")]
    HostPortConflict {
        port: u16,
        first: String,
        second: String,
    },

    #[error("container '{container}' remaps host port {host} in vpc mode (must equal container port {container_port})")]
    HostPortRemapInVpcMode {
        container: String,
        host: u16,
        container_port: u16,
    },

    #[error("container '{0}' declared twice in one compute unit")]
    DuplicateContainer(String),

    #[error("compute unit '{0}' exposes no port for ingress to target")]
    NoExposedPort(String),

    #[error("volume '{volume}' sources data tier '{tier}', which is not a shared filesystem")]
    VolumeSourceNotFilesystem { volume: String, tier: String },

    #[error("node '{0}' declared twice in the composition graph")]
    DuplicateNode(String),

    #[error("dependency cycle in the composition graph involving '{0}'")]
    DependencyCycle(String),

    #[error("invalid name '{0}': must match ^[a-z0-9]([a-z0-9-]{{0,38}}[a-z0-9])?$")]
    InvalidName(String),
}

// ── Reference errors ──────────────────────────────────────────────────────────

/// A reference to something that does not exist or is not yet available.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("node '{0}' is referenced but not declared")]
    UnknownNode(String),

    #[error("container '{container}' start-order references undeclared container '{dependency}'")]
    UnknownContainer {
        container: String,
        dependency: String,
    },

    #[error("secret field '{field}' of '{secret}' is not a known field (expected one of: {known})")]
    UnknownSecretField {
        secret: String,
        field: String,
        known: String,
    },

    #[error("'{from}' is not a relational data tier and carries no credential secret")]
    NoSecretForTier { from: String },

    #[error("attribute '{attribute}' of node '{node}' is not declared")]
    UnknownAttribute { node: String, attribute: String },

    #[error("attribute '{attribute}' of node '{node}' read before resolution")]
    Unresolved { node: String, attribute: String },

    #[error("attribute '{attribute}' of node '{node}' resolved twice")]
    AlreadyResolved { node: String, attribute: String },
}

// ── Provisioning errors ───────────────────────────────────────────────────────

/// The control plane rejected or failed a create/delete call.
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("control plane rejected node '{node}': {reason}")]
    Rejected { node: String, reason: String },

    #[error("resource '{0}' not found in the control-plane inventory")]
    NotFound(String),
}
