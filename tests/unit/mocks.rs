//! Shared mock infrastructure for unit tests.
//!
//! Provides canned [`CloudProvider`] and [`DeploymentStore`] implementations
//! so each test file doesn't have to re-define the same boilerplate.

#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not every test file uses every helper

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use stratus_cli::application::ports::{
    CloudProvider, CreateRequest, CreatedResource, DeploymentStore, ProgressReporter,
};
use stratus_cli::domain::error::ProvisioningError;
use stratus_cli::domain::graph::NodeKind;
use stratus_cli::domain::record::DeploymentRecord;

// ── Mock: no-op progress reporter ────────────────────────────────────────────

pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

// ── Mock: recording provider ──────────────────────────────────────────────────

/// Records all create and delete calls and synthesizes attributes the way the
/// local control plane does. Handles are `h-<node>` for easy assertions.
pub struct RecordingProvider {
    creates: Mutex<Vec<CreateRequest>>,
    deletes: Mutex<Vec<String>>,
    fail_create_on: Option<String>,
    fail_delete_on: Option<String>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            creates: Mutex::new(Vec::new()),
            deletes: Mutex::new(Vec::new()),
            fail_create_on: None,
            fail_delete_on: None,
        }
    }

    /// Reject the create call for the named node.
    pub fn failing_create_on(node: &str) -> Self {
        Self {
            fail_create_on: Some(node.to_owned()),
            ..Self::new()
        }
    }

    /// Reject the delete call for the named node's handle.
    pub fn failing_delete_on(node: &str) -> Self {
        Self {
            fail_delete_on: Some(format!("h-{node}")),
            ..Self::new()
        }
    }

    pub fn create_count(&self) -> usize {
        self.creates.lock().expect("lock").len()
    }

    /// Node ids in creation order.
    pub fn created_nodes(&self) -> Vec<String> {
        self.creates
            .lock()
            .expect("lock")
            .iter()
            .map(|r| r.node.clone())
            .collect()
    }

    /// Handles in deletion order.
    pub fn deleted_handles(&self) -> Vec<String> {
        self.deletes.lock().expect("lock").clone()
    }

    /// The captured create request for one node.
    pub fn request_for(&self, node: &str) -> Option<CreateRequest> {
        self.creates
            .lock()
            .expect("lock")
            .iter()
            .find(|r| r.node == node)
            .cloned()
    }

    fn attributes_for(request: &CreateRequest, handle: &str) -> BTreeMap<String, String> {
        let mut attrs = BTreeMap::new();
        match request.kind {
            NodeKind::Network => {
                attrs.insert("network.id".to_owned(), handle.to_owned());
            }
            NodeKind::SecurityBoundary => {
                attrs.insert("boundary.id".to_owned(), handle.to_owned());
            }
            NodeKind::DataTier => {
                attrs.insert(
                    "endpoint.host".to_owned(),
                    format!("{}.{}.stratus.internal", request.node, request.topology),
                );
                let port = request.payload["port"].as_u64().unwrap_or(0);
                attrs.insert("endpoint.port".to_owned(), port.to_string());
                if !request.payload["tier"]["access_point_root"].is_null() {
                    attrs.insert("access_point.id".to_owned(), format!("fsap-{handle}"));
                }
            }
            NodeKind::Secret => {
                let tier = request.payload["tier"].as_str().unwrap_or("unknown");
                attrs.insert(
                    "secret.arn".to_owned(),
                    format!("secret://{}/{tier}", request.topology),
                );
            }
            NodeKind::ComputeService => {
                attrs.insert("service.id".to_owned(), handle.to_owned());
                attrs.insert("service.start_order".to_owned(), String::new());
            }
            NodeKind::Ingress => {
                attrs.insert(
                    "address".to_owned(),
                    format!("http://{}.ingress.stratus.example", request.topology),
                );
            }
            NodeKind::Wiring => {}
        }
        attrs
    }
}

impl CloudProvider for RecordingProvider {
    async fn create(&self, request: &CreateRequest) -> Result<CreatedResource> {
        if self.fail_create_on.as_deref() == Some(request.node.as_str()) {
            return Err(ProvisioningError::Rejected {
                node: request.node.clone(),
                reason: "injected failure".to_owned(),
            }
            .into());
        }
        self.creates.lock().expect("lock").push(request.clone());
        let handle = format!("h-{}", request.node);
        let attributes = Self::attributes_for(request, &handle);
        Ok(CreatedResource { handle, attributes })
    }

    async fn delete(&self, handle: &str) -> Result<()> {
        if self.fail_delete_on.as_deref() == Some(handle) {
            return Err(ProvisioningError::NotFound(handle.to_owned()).into());
        }
        self.deletes.lock().expect("lock").push(handle.to_owned());
        Ok(())
    }
}

// ── Mock: in-memory record store ──────────────────────────────────────────────

pub struct MemoryStore {
    records: Mutex<BTreeMap<String, DeploymentRecord>>,
    save_calls: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            save_calls: Mutex::new(0),
        }
    }

    pub fn save_count(&self) -> u32 {
        *self.save_calls.lock().expect("lock")
    }

    pub fn record(&self, topology: &str) -> Option<DeploymentRecord> {
        self.records.lock().expect("lock").get(topology).cloned()
    }
}

impl DeploymentStore for MemoryStore {
    async fn load(&self, topology: &str) -> Result<Option<DeploymentRecord>> {
        Ok(self.records.lock().expect("lock").get(topology).cloned())
    }

    async fn save(&self, record: &DeploymentRecord) -> Result<()> {
        *self.save_calls.lock().expect("lock") += 1;
        self.records
            .lock()
            .expect("lock")
            .insert(record.topology.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, topology: &str) -> Result<()> {
        self.records.lock().expect("lock").remove(topology);
        Ok(())
    }
}
