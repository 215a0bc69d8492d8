//! Infrastructure implementation of the `CloudProvider` port.
//!
//! `LocalControlPlane` provisions deterministically into an on-disk
//! inventory: generated identifiers, synthesized endpoints, secret handles.
//! Handles derive from `(topology, node)` so a repeated create returns the
//! original resource and a repeated delete of a gone handle succeeds —
//! idempotent on retry, per the port contract.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::ports::{CloudProvider, CreateRequest, CreatedResource};
use crate::domain::error::ProvisioningError;
use crate::domain::graph::NodeKind;
use crate::infra::state::stratus_home;

/// On-disk inventory of realized resources, keyed by handle.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Inventory {
    #[serde(default)]
    resources: BTreeMap<String, InventoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryEntry {
    topology: String,
    node: String,
    kind: NodeKind,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

/// The shipped control-plane adapter: a deterministic local inventory.
pub struct LocalControlPlane {
    root: PathBuf,
}

impl LocalControlPlane {
    /// Create a control plane rooted at the default stratus home.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_root(stratus_home()?))
    }

    /// Create a control plane with an explicit root (used in tests).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn inventory_path(&self) -> PathBuf {
        self.root.join("inventory.json")
    }

    fn load_inventory(&self) -> Result<Inventory> {
        let path = self.inventory_path();
        if !path.exists() {
            return Ok(Inventory::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading inventory {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing inventory {}", path.display()))
    }

    fn save_inventory(&self, inventory: &Inventory) -> Result<()> {
        let path = self.inventory_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(inventory).context("serializing inventory")?;
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &path)
            .with_context(|| format!("finalizing inventory {}", path.display()))?;
        Ok(())
    }

    fn handle_for(request: &CreateRequest) -> String {
        let prefix = match request.kind {
            NodeKind::Network => "net",
            NodeKind::SecurityBoundary => "sb",
            NodeKind::DataTier => "dt",
            NodeKind::Secret => "sec",
            NodeKind::ComputeService => "svc",
            NodeKind::Ingress => "ing",
            NodeKind::Wiring => "wire",
        };
        // DefaultHasher with default keys is deterministic, which is what
        // makes repeated creates land on the same handle.
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        request.topology.hash(&mut hasher);
        request.node.hash(&mut hasher);
        format!("{prefix}-{:012x}", hasher.finish() & 0xffff_ffff_ffff)
    }

    /// Synthesize the resolved attributes for a create request.
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
                let order = request.payload["start_order"]
                    .as_array()
                    .map(|names| {
                        names
                            .iter()
                            .filter_map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(",")
                    })
                    .unwrap_or_default();
                attrs.insert("service.start_order".to_owned(), order);
            }
            NodeKind::Ingress => {
                let port = request.payload["listener_port"].as_u64().unwrap_or(80);
                let host = format!("{}.ingress.stratus.example", request.topology);
                let address = if port == 80 {
                    format!("http://{host}")
                } else {
                    format!("http://{host}:{port}")
                };
                attrs.insert("address".to_owned(), address);
            }
            NodeKind::Wiring => {}
        }
        attrs
    }

    fn create_sync(&self, request: &CreateRequest) -> Result<CreatedResource> {
        let handle = Self::handle_for(request);
        let mut inventory = self.load_inventory()?;

        // Idempotent retry: the same declaration returns the original resource.
        if let Some(existing) = inventory.resources.get(&handle) {
            return Ok(CreatedResource {
                handle,
                attributes: existing.attributes.clone(),
            });
        }

        if !request.payload.is_object() {
            return Err(ProvisioningError::Rejected {
                node: request.node.clone(),
                reason: "payload is not a JSON object".to_owned(),
            }
            .into());
        }

        let attributes = Self::attributes_for(request, &handle);
        inventory.resources.insert(
            handle.clone(),
            InventoryEntry {
                topology: request.topology.clone(),
                node: request.node.clone(),
                kind: request.kind,
                attributes: attributes.clone(),
            },
        );
        self.save_inventory(&inventory)?;

        Ok(CreatedResource { handle, attributes })
    }

    fn delete_sync(&self, handle: &str) -> Result<()> {
        let mut inventory = self.load_inventory()?;
        if inventory.resources.remove(handle).is_some() {
            self.save_inventory(&inventory)?;
        }
        Ok(())
    }
}

impl CloudProvider for LocalControlPlane {
    async fn create(&self, request: &CreateRequest) -> Result<CreatedResource> {
        let root = self.root.clone();
        let request = request.clone();
        tokio::task::spawn_blocking(move || LocalControlPlane::with_root(root).create_sync(&request))
            .await
            .context("control-plane create task panicked")?
    }

    async fn delete(&self, handle: &str) -> Result<()> {
        let root = self.root.clone();
        let handle = handle.to_owned();
        tokio::task::spawn_blocking(move || LocalControlPlane::with_root(root).delete_sync(&handle))
            .await
            .context("control-plane delete task panicked")?
    }
}
