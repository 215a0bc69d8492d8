//! Public traffic ingress declaration.

use serde::{Deserialize, Serialize};

/// Listener protocol for the public entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListenerProtocol {
    Http,
    Tcp,
}

/// A load-balancing listener bound to one compute unit's exposed port.
///
/// Target registration is deferred until the unit's runtime service exists;
/// the composer encodes that as a graph dependency on the unit node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressSpec {
    /// Target compute unit name.
    pub unit: String,
    pub listener_port: u16,
    pub protocol: ListenerProtocol,
    /// Whether the listener is internet-facing.
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}
