//! Write-once attribute cells.
//!
//! A provisioned resource produces attributes (endpoints, identifiers, secret
//! handles) that are unknown until the control plane has realized it. Each
//! such attribute is an explicit promise: declared at graph-build time,
//! resolved exactly once during realization, and an error to read before
//! resolution. Consumers never see a default or placeholder value.

use std::sync::{Arc, OnceLock};

use anyhow::Result;

use crate::domain::error::ReferenceError;

/// A named, write-once attribute of a graph node.
///
/// Cloning shares the underlying cell, so a consumer holding a clone observes
/// the producer's resolution.
#[derive(Debug, Clone)]
pub struct Attribute {
    node: String,
    name: String,
    cell: Arc<OnceLock<String>>,
}

impl Attribute {
    /// Declare a pending attribute for `node`.
    #[must_use]
    pub fn pending(node: &str, name: &str) -> Self {
        Self {
            node: node.to_owned(),
            name: name.to_owned(),
            cell: Arc::new(OnceLock::new()),
        }
    }

    /// Attribute name as declared (e.g. `endpoint.host`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the attribute. Each cell resolves exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::AlreadyResolved`] on a second resolution.
    pub fn resolve(&self, value: String) -> Result<()> {
        self.cell.set(value).map_err(|_| {
            ReferenceError::AlreadyResolved {
                node: self.node.clone(),
                attribute: self.name.clone(),
            }
            .into()
        })
    }

    /// Read the resolved value.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Unresolved`] if the producer has not been
    /// realized yet. For a valid graph the realization order makes this
    /// unreachable; hitting it means a dependency edge is missing.
    pub fn get(&self) -> Result<String> {
        self.cell.get().cloned().ok_or_else(|| {
            ReferenceError::Unresolved {
                node: self.node.clone(),
                attribute: self.name.clone(),
            }
            .into()
        })
    }

    /// Whether the attribute has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }
}
