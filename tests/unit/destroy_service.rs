//! Tests for the `destroy` application service.
//!
//! Verifies reverse-order teardown, teardown-policy retention, and the
//! partial-failure record left behind for a retry.

#![allow(clippy::expect_used)]

use stratus_cli::application::services::deploy::deploy_stack;
use stratus_cli::application::services::destroy::destroy_stack;
use stratus_cli::domain::descriptor::TopologyDescriptor;

use crate::mocks::{MemoryStore, NoopReporter, RecordingProvider};

fn descriptor(teardown: &str) -> TopologyDescriptor {
    TopologyDescriptor::from_yaml(&format!(
        r"
name: scenario-d
network:
  cidr: 10.0.0.0/16
  subnet_groups:
    - name: apps
      class: private-routable
    - name: data
      class: private-isolated
data_tiers:
  - name: database
    kind: relational
    subnet_group: data
    teardown: {teardown}
    capacity: {{ min: 1, max: 2 }}
compute_units:
  - name: cms
    network_mode: vpc
    subnet_group: apps
    cpu_units: 256
    memory_mib: 512
    containers:
      - name: app
        image: registry.example/cms:1
        ports:
          - container_port: 8080
        env:
          DB_USER: {{ secret: {{ from: database, field: username }} }}
"
    ))
    .expect("descriptor parses")
}

#[tokio::test]
async fn test_scenario_d_releases_in_exact_reverse_creation_order() {
    let provider = RecordingProvider::new();
    let store = MemoryStore::new();

    deploy_stack(&provider, &store, &NoopReporter, &descriptor("destroy"))
        .await
        .expect("deploy succeeds");
    let created = provider.created_nodes();

    let outcome = destroy_stack(&provider, &store, &NoopReporter, "scenario-d")
        .await
        .expect("destroy succeeds");

    let expected: Vec<String> = created.iter().rev().map(|n| format!("h-{n}")).collect();
    assert_eq!(provider.deleted_handles(), expected);
    assert_eq!(outcome.nodes_deleted, created.len());
    assert_eq!(outcome.nodes_retained, 0);
    assert!(
        store.record("scenario-d").is_none(),
        "record dropped after destroy"
    );
}

#[tokio::test]
async fn test_retained_tier_survives_destroy() {
    let provider = RecordingProvider::new();
    let store = MemoryStore::new();

    deploy_stack(&provider, &store, &NoopReporter, &descriptor("retain"))
        .await
        .expect("deploy succeeds");

    let outcome = destroy_stack(&provider, &store, &NoopReporter, "scenario-d")
        .await
        .expect("destroy succeeds");

    assert_eq!(outcome.nodes_retained, 1);
    assert!(
        !provider.deleted_handles().contains(&"h-database".to_owned()),
        "retained tier must not be deleted"
    );
    assert!(store.record("scenario-d").is_none());
}

#[tokio::test]
async fn test_destroy_without_record_is_an_error() {
    let provider = RecordingProvider::new();
    let store = MemoryStore::new();

    let err = destroy_stack(&provider, &store, &NoopReporter, "never-deployed")
        .await
        .expect_err("nothing recorded");
    assert!(err.to_string().contains("no recorded deployment"));
    assert!(provider.deleted_handles().is_empty());
}

#[tokio::test]
async fn test_failed_delete_saves_remaining_record() {
    let provider = RecordingProvider::failing_delete_on("database");
    let store = MemoryStore::new();

    deploy_stack(&provider, &store, &NoopReporter, &descriptor("destroy"))
        .await
        .expect("deploy succeeds");

    let err = destroy_stack(&provider, &store, &NoopReporter, "scenario-d")
        .await
        .expect_err("database delete is rejected");
    assert!(
        format!("{err:#}").contains("deleting node 'database'"),
        "error must name the failing node: {err:#}"
    );

    let record = store.record("scenario-d").expect("remaining record saved");
    let remaining: Vec<&str> = record.nodes.iter().map(|n| n.node.as_str()).collect();
    assert!(remaining.contains(&"database"), "failed node stays recorded");
    assert!(remaining.contains(&"network"), "undeleted nodes stay recorded");
    assert!(
        !remaining.contains(&"wiring"),
        "nodes deleted before the failure are dropped"
    );
}
