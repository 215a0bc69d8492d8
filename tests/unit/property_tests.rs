//! Property-based tests for critical graph and validation logic.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use stratus_cli::domain::descriptor::validate_name;
use stratus_cli::domain::graph::{CompositionGraph, NodeKind};
use stratus_cli::domain::security::{
    Direction, Peer, Protocol, SecurityBoundary, SecurityRule,
};

// ============================================================================
// realization_order() property tests
// ============================================================================

/// Strategy: a random DAG as, per node, a set of dependencies on
/// earlier-declared nodes. Edges only point backwards, so the graph is
/// acyclic by construction.
fn arb_dag() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..4), 1..20)
        .prop_map(|nodes| {
            nodes
                .iter()
                .enumerate()
                .map(|(i, picks)| {
                    let mut deps: Vec<usize> =
                        picks.iter().filter(|_| i > 0).map(|p| p.index(i.max(1))).collect();
                    deps.sort_unstable();
                    deps.dedup();
                    deps
                })
                .collect()
        })
}

proptest! {
    /// For all valid declarations, the computed realization order is a valid
    /// topological sort: every node appears after all of its dependencies.
    #[test]
    fn prop_realization_order_is_a_valid_topological_sort(dag in arb_dag()) {
        let mut graph = CompositionGraph::new();
        for (i, deps) in dag.iter().enumerate() {
            let dep_ids: Vec<String> = deps.iter().map(|d| format!("n{d}")).collect();
            graph
                .add(&format!("n{i}"), NodeKind::DataTier, dep_ids)
                .expect("backward edges only");
        }

        let order = graph.realization_order().expect("acyclic by construction");
        prop_assert_eq!(order.len(), dag.len());

        let position = |id: &str| order.iter().position(|n| n.id == id).expect("placed");
        for (i, deps) in dag.iter().enumerate() {
            let node_pos = position(&format!("n{i}"));
            for dep in deps {
                prop_assert!(
                    position(&format!("n{dep}")) < node_pos,
                    "n{} realized before its dependency n{}", i, dep
                );
            }
        }
    }
}

// ============================================================================
// SecurityBoundary idempotence property tests
// ============================================================================

fn arb_rule() -> impl Strategy<Value = SecurityRule> {
    (
        prop::bool::ANY,
        prop::bool::ANY,
        prop::option::of(any::<u16>()),
        prop::sample::select(vec!["0.0.0.0/0", "cms-boundary", "database-boundary"]),
    )
        .prop_map(|(ingress, tcp, port, peer)| SecurityRule {
            direction: if ingress {
                Direction::Ingress
            } else {
                Direction::Egress
            },
            protocol: if tcp { Protocol::Tcp } else { Protocol::Udp },
            port,
            peer: if peer.contains('/') {
                Peer::Cidr(peer.to_owned())
            } else {
                Peer::Boundary(peer.to_owned())
            },
        })
}

proptest! {
    /// Re-applying every rule a second time never grows the effective set.
    #[test]
    fn prop_rule_application_is_idempotent(rules in prop::collection::vec(arb_rule(), 0..16)) {
        let mut boundary = SecurityBoundary::new("prop-boundary");
        for rule in &rules {
            boundary.allow(rule.clone());
        }
        let effective = boundary.len();
        for rule in &rules {
            prop_assert!(!boundary.allow(rule.clone()), "duplicate insert must be a no-op");
        }
        prop_assert_eq!(boundary.len(), effective);
    }
}

// ============================================================================
// validate_name() property tests
// ============================================================================

proptest! {
    /// Names drawn from the documented shape always validate.
    #[test]
    fn prop_wellformed_names_accepted(name in "[a-z0-9]([a-z0-9-]{0,38}[a-z0-9])?") {
        prop_assert!(validate_name(&name).is_ok(), "rejected well-formed name: {name}");
    }

    /// Uppercase or underscore names are always rejected.
    #[test]
    fn prop_malformed_names_rejected(name in "[A-Z_]{1,20}") {
        prop_assert!(validate_name(&name).is_err(), "accepted malformed name: {name}");
    }
}
