//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::domain::graph::NodeKind;
use crate::domain::record::DeploymentRecord;

// ── Value Types ───────────────────────────────────────────────────────────────

/// One create call against the control plane.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// Topology the node belongs to.
    pub topology: String,
    /// Graph node id; `(topology, node)` keys idempotent retries.
    pub node: String,
    pub kind: NodeKind,
    /// Rendered resource declaration.
    pub payload: serde_json::Value,
}

/// What the control plane returns for a realized resource.
#[derive(Debug, Clone)]
pub struct CreatedResource {
    /// Handle for later deletion.
    pub handle: String,
    /// Resolved attributes (endpoints, identifiers, secret handles).
    pub attributes: BTreeMap<String, String>,
}

// ── Control-Plane Port ────────────────────────────────────────────────────────

/// The external control plane that actually creates and deletes resources.
///
/// Both operations are idempotent on retry for the same declaration: a
/// repeated `create` for an already-realized node returns the original
/// handle and attributes, and a repeated `delete` of a gone handle succeeds.
#[allow(async_fn_in_trait)]
pub trait CloudProvider {
    /// Realize one resource and return its resolved attributes.
    async fn create(&self, request: &CreateRequest) -> Result<CreatedResource>;
    /// Release one resource by handle.
    async fn delete(&self, handle: &str) -> Result<()>;
}

// ── Deployment Record Port ────────────────────────────────────────────────────

/// Abstracts persistence of per-topology deployment records.
#[allow(async_fn_in_trait)]
pub trait DeploymentStore {
    /// Load the record for a topology, `None` if it was never deployed.
    async fn load(&self, topology: &str) -> Result<Option<DeploymentRecord>>;
    /// Persist the given record.
    async fn save(&self, record: &DeploymentRecord) -> Result<()>;
    /// Drop the record for a topology.
    async fn remove(&self, topology: &str) -> Result<()>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait — no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
