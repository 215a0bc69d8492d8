//! Domain layer — pure composition logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod attribute;
pub mod compute;
pub mod data_tier;
pub mod descriptor;
pub mod error;
pub mod graph;
pub mod ingress;
pub mod network;
pub mod record;
pub mod secret;
pub mod security;
pub mod stack;
pub mod wiring;

#[allow(unused_imports)]
pub use descriptor::{TopologyDescriptor, validate_name};
#[allow(unused_imports)]
pub use error::{ConfigurationError, ProvisioningError, ReferenceError};
#[allow(unused_imports)]
pub use graph::{CompositionGraph, Node, NodeKind};
#[allow(unused_imports)]
pub use record::{DeploymentRecord, RealizedNode};
#[allow(unused_imports)]
pub use stack::{INGRESS_NODE, NETWORK_NODE, Stack, WIRING_NODE};
