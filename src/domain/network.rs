//! Network topology types and subnet allocation.
//!
//! This module is intentionally free of I/O, async, and external layer
//! imports. A requested CIDR range is carved into consecutive /24 blocks,
//! one per subnet group, and every group carries a reachability class that
//! later placement checks consult.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigurationError;

/// Reachability class of a subnet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReachabilityClass {
    /// Auto-assigned public addressing; directly routable from the internet.
    Public,
    /// No public addressing; outbound internet via NAT when requested.
    PrivateRoutable,
    /// No route to the internet in either direction.
    PrivateIsolated,
}

impl fmt::Display for ReachabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::PrivateRoutable => "private-routable",
            Self::PrivateIsolated => "private-isolated",
        };
        f.write_str(s)
    }
}

/// Operator-declared subnet group request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetGroupSpec {
    /// Group name, referenced by resource placements.
    pub name: String,
    /// Reachability class for every subnet in the group.
    pub class: ReachabilityClass,
    /// Whether the group routes outbound internet traffic through NAT.
    /// Only meaningful for `private-routable` groups.
    #[serde(default)]
    pub nat: bool,
}

/// Operator-declared network request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// CIDR block to partition, e.g. `10.0.0.0/16`.
    pub cidr: String,
    /// Subnet groups to carve out of the block.
    pub subnet_groups: Vec<SubnetGroupSpec>,
}

// ── CIDR arithmetic ───────────────────────────────────────────────────────────

/// An IPv4 CIDR block. Plain u32 math; prefixes longer than /24 cannot hold
/// a subnet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CidrBlock {
    addr: u32,
    prefix: u8,
}

impl CidrBlock {
    /// Number of /24 subnets this block can hold.
    #[must_use]
    pub fn capacity_24(&self) -> usize {
        if self.prefix > 24 {
            0
        } else {
            1 << (24 - self.prefix)
        }
    }

    /// The `index`-th /24 subnet inside this block, if it fits.
    #[must_use]
    pub fn subnet_24(&self, index: usize) -> Option<CidrBlock> {
        if index >= self.capacity_24() {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let offset = (index as u32) << 8;
        Some(CidrBlock {
            addr: self.addr + offset,
            prefix: 24,
        })
    }
}

impl FromStr for CidrBlock {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigurationError::InvalidCidr(s.to_owned());
        let (addr_part, prefix_part) = s.split_once('/').ok_or_else(invalid)?;
        let prefix: u8 = prefix_part.parse().map_err(|_| invalid())?;
        if prefix > 32 {
            return Err(invalid());
        }
        let mut octets = [0u8; 4];
        let mut count = 0;
        for part in addr_part.split('.') {
            if count == 4 {
                return Err(invalid());
            }
            octets[count] = part.parse().map_err(|_| invalid())?;
            count += 1;
        }
        if count != 4 {
            return Err(invalid());
        }
        let addr = u32::from_be_bytes(octets);
        let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
        if addr & !mask != 0 {
            return Err(invalid());
        }
        Ok(CidrBlock { addr, prefix })
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = self.addr.to_be_bytes();
        write!(f, "{}.{}.{}.{}/{}", o[0], o[1], o[2], o[3], self.prefix)
    }
}

impl From<CidrBlock> for String {
    fn from(c: CidrBlock) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for CidrBlock {
    type Error = ConfigurationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ── Allocated topology ────────────────────────────────────────────────────────

/// A subnet group with its concrete allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetGroup {
    /// Group name.
    pub name: String,
    /// Reachability class.
    pub class: ReachabilityClass,
    /// Allocated /24 block.
    pub cidr: CidrBlock,
    /// Whether the group has a route to the internet (public addressing or NAT).
    pub routes_internet: bool,
}

/// The virtual network with concrete subnet allocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkTopology {
    /// The partitioned range.
    pub cidr: CidrBlock,
    /// Allocated groups, in declaration order.
    pub groups: Vec<SubnetGroup>,
}

impl NetworkTopology {
    /// Allocate one /24 per requested subnet group out of `spec.cidr`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the CIDR is malformed, the range
    /// cannot hold every group, a group name repeats, or a private-isolated
    /// group requests NAT.
    pub fn allocate(spec: &NetworkSpec) -> Result<Self> {
        let cidr: CidrBlock = spec.cidr.parse()?;
        if spec.subnet_groups.len() > cidr.capacity_24() {
            return Err(ConfigurationError::AddressSpaceExhausted {
                cidr: spec.cidr.clone(),
                requested: spec.subnet_groups.len(),
            }
            .into());
        }

        let mut groups: Vec<SubnetGroup> = Vec::with_capacity(spec.subnet_groups.len());
        for (index, group) in spec.subnet_groups.iter().enumerate() {
            if groups.iter().any(|g| g.name == group.name) {
                return Err(ConfigurationError::DuplicateSubnetGroup(group.name.clone()).into());
            }
            if group.nat && group.class == ReachabilityClass::PrivateIsolated {
                return Err(ConfigurationError::NatOnIsolatedGroup(group.name.clone()).into());
            }
            let allocated = cidr.subnet_24(index).ok_or_else(|| {
                ConfigurationError::AddressSpaceExhausted {
                    cidr: spec.cidr.clone(),
                    requested: spec.subnet_groups.len(),
                }
            })?;
            let routes_internet = match group.class {
                ReachabilityClass::Public => true,
                ReachabilityClass::PrivateRoutable => group.nat,
                ReachabilityClass::PrivateIsolated => false,
            };
            groups.push(SubnetGroup {
                name: group.name.clone(),
                class: group.class,
                cidr: allocated,
                routes_internet,
            });
        }

        Ok(Self { cidr, groups })
    }

    /// Look up a group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&SubnetGroup> {
        self.groups.iter().find(|g| g.name == name)
    }
}
