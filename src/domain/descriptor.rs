//! The deployment descriptor: the external YAML form of a topology.
//!
//! A descriptor enumerates subnet groups, data tiers, compute units, and the
//! ingress listener. Parsing is pure (string in, struct out); deeper
//! consistency checks happen when the composer builds the graph.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::compute::ComputeUnit;
use crate::domain::data_tier::DataTierSpec;
use crate::domain::error::ConfigurationError;
use crate::domain::ingress::IngressSpec;
use crate::domain::network::NetworkSpec;

/// A full topology declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDescriptor {
    /// Topology name; keys the deployment record.
    pub name: String,
    pub network: NetworkSpec,
    #[serde(default)]
    pub data_tiers: Vec<DataTierSpec>,
    #[serde(default)]
    pub compute_units: Vec<ComputeUnit>,
    #[serde(default)]
    pub ingress: Option<IngressSpec>,
}

impl TopologyDescriptor {
    /// Parse a descriptor from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not match the descriptor schema.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(text);
        serde_yaml::with::singleton_map_recursive::deserialize(deserializer)
            .context("parsing topology descriptor")
    }
}

/// Validate a topology or resource name.
///
/// Lowercase alphanumerics and hyphens, 1-40 characters, no leading or
/// trailing hyphen. Names become graph node ids, state file names, and
/// synthesized hostnames, so the character set is deliberately narrow.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidName`] on a mismatch.
pub fn validate_name(name: &str) -> Result<()> {
    #[allow(clippy::expect_used)] // pattern is a compile-time constant
    let pattern = regex::Regex::new("^[a-z0-9]([a-z0-9-]{0,38}[a-z0-9])?$")
        .expect("valid name pattern");
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidName(name.to_owned()).into())
    }
}
