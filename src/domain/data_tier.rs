//! Data tier declarations: relational cluster or shared filesystem.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigurationError;

/// Default port for a relational tier.
pub const RELATIONAL_PORT: u16 = 3306;
/// Default port for a shared filesystem tier.
pub const FILESYSTEM_PORT: u16 = 2049;

/// Compute-capacity scaling bounds for a relational tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CapacityBounds {
    pub min: u32,
    pub max: u32,
}

/// What happens to the tier's data on `destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// The control plane keeps the resource; `destroy` only drops the record.
    Retain,
    /// The resource is deleted with the rest of the topology.
    Destroy,
}

impl Default for TeardownPolicy {
    fn default() -> Self {
        Self::Retain
    }
}

/// Kind-specific settings, tagged on `kind` in the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TierSettings {
    Relational {
        capacity: CapacityBounds,
        /// Pause compute after this many idle minutes; `None` disables pause.
        #[serde(default)]
        auto_pause_minutes: Option<u32>,
        #[serde(default = "default_charset")]
        charset: String,
        #[serde(default = "default_collation")]
        collation: String,
        #[serde(default = "default_backup_retention")]
        backup_retention_days: u32,
    },
    Filesystem {
        /// Narrow the filesystem's visible root for consumers.
        #[serde(default)]
        access_point_root: Option<String>,
    },
}

fn default_charset() -> String {
    "utf8mb4".to_owned()
}

fn default_collation() -> String {
    "utf8mb4_unicode_ci".to_owned()
}

fn default_backup_retention() -> u32 {
    7
}

/// Operator-declared data tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataTierSpec {
    /// Tier name; also the graph node id.
    pub name: String,
    /// Subnet group placement. Must resolve to a non-public group.
    pub subnet_group: String,
    /// Connection port. Defaults by kind (3306 relational, 2049 filesystem).
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub teardown: TeardownPolicy,
    #[serde(flatten)]
    pub settings: TierSettings,
}

impl DataTierSpec {
    /// Whether this tier is a relational cluster (and so carries a secret).
    #[must_use]
    pub fn is_relational(&self) -> bool {
        matches!(self.settings, TierSettings::Relational { .. })
    }

    /// The port consumers connect to.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(match self.settings {
            TierSettings::Relational { .. } => RELATIONAL_PORT,
            TierSettings::Filesystem { .. } => FILESYSTEM_PORT,
        })
    }

    /// The filesystem access point root, if one was requested.
    #[must_use]
    pub fn access_point_root(&self) -> Option<&str> {
        match &self.settings {
            TierSettings::Filesystem { access_point_root } => access_point_root.as_deref(),
            TierSettings::Relational { .. } => None,
        }
    }

    /// Validate declaration-internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::CapacityBounds`] when `min > max`.
    /// Placement checks live in the composer, which knows the topology.
    pub fn validate(&self) -> Result<()> {
        if let TierSettings::Relational { capacity, .. } = &self.settings {
            if capacity.min > capacity.max {
                return Err(ConfigurationError::CapacityBounds {
                    name: self.name.clone(),
                    min: capacity.min,
                    max: capacity.max,
                }
                .into());
            }
        }
        Ok(())
    }
}
