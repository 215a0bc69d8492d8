//! Reachability wiring: derived consumer → producer grants.
//!
//! After every tier has its network identity, the wiring stage traverses the
//! compute units' declared references (environment values and volume sources
//! pointing at data-tier endpoints) and emits one directed grant per distinct
//! (consumer, producer, port) triple. The set form makes deduplication and
//! idempotence structural: recomputing over an unchanged stack yields an
//! identical set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::compute::{EnvValue, VolumeSource};
use crate::domain::stack::{INGRESS_NODE, Stack};

/// A derived permission: `consumer` may initiate traffic to `producer:port`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReachabilityGrant {
    pub consumer: String,
    pub producer: String,
    pub port: u16,
}

/// Compute the minimal grant set for a composed stack.
#[must_use]
pub fn derive_grants(stack: &Stack) -> BTreeSet<ReachabilityGrant> {
    let mut grants = BTreeSet::new();

    for unit in &stack.descriptor.compute_units {
        for container in &unit.containers {
            for value in container.env.values() {
                let tier_name = match value {
                    EnvValue::Secret { secret } => Some(&secret.from),
                    EnvValue::Attribute { attribute } => Some(&attribute.node),
                    EnvValue::Literal(_) => None,
                };
                if let Some(name) = tier_name {
                    if let Some(tier) = stack.tier(name) {
                        grants.insert(ReachabilityGrant {
                            consumer: unit.name.clone(),
                            producer: tier.name.clone(),
                            port: tier.port(),
                        });
                    }
                }
            }
        }
        for volume in &unit.volumes {
            if let VolumeSource::Filesystem { tier } = &volume.source {
                if let Some(spec) = stack.tier(tier) {
                    grants.insert(ReachabilityGrant {
                        consumer: unit.name.clone(),
                        producer: spec.name.clone(),
                        port: spec.port(),
                    });
                }
            }
        }
    }

    if let Some(ingress) = &stack.descriptor.ingress {
        if let Some(unit) = stack.unit(&ingress.unit) {
            if let Some(port) = unit.exposed_port() {
                grants.insert(ReachabilityGrant {
                    consumer: INGRESS_NODE.to_owned(),
                    producer: unit.name.clone(),
                    port,
                });
            }
        }
    }

    grants
}
