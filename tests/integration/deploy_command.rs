//! End-to-end deploy/status/destroy tests against the local control plane.
//!
//! Every test gets its own `STRATUS_HOME` so runs are hermetic and can
//! execute in parallel.

#![allow(clippy::expect_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn stratus_in(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stratus"));
    cmd.env("NO_COLOR", "1");
    cmd.env("STRATUS_HOME", home);
    cmd
}

#[test]
fn test_deploy_serverless_prints_ingress_address() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "cms-serverless"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "http://cms-serverless.ingress.stratus.example",
        ))
        .stdout(predicate::str::contains("deployed"));
}

#[test]
fn test_deploy_bridge_variant_succeeds() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "cms-bridge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cms-bridge"));
}

#[test]
fn test_deploy_json_outputs_machine_readable_outcome() {
    let home = tempfile::tempdir().expect("tempdir");
    let output = stratus_in(home.path())
        .args(["--json", "deploy", "cms-serverless"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: serde_json::Value =
        serde_json::from_slice(&output).expect("stdout is valid JSON");
    assert_eq!(parsed["topology"], "cms-serverless");
    assert_eq!(
        parsed["ingress_address"],
        "http://cms-serverless.ingress.stratus.example"
    );
    assert!(parsed["nodes_created"].as_u64().expect("count") > 5);
}

#[test]
fn test_status_shows_deployment_and_nodes() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "cms-serverless"])
        .assert()
        .success();

    stratus_in(home.path())
        .args(["status", "cms-serverless"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deployment: cms-serverless"))
        .stdout(predicate::str::contains("network"))
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("wiring"));
}

#[test]
fn test_status_of_undeployed_topology_is_informative() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["status", "cms-bridge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not deployed"));
}

#[test]
fn test_destroy_releases_everything_and_clears_record() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "cms-serverless"])
        .assert()
        .success();

    stratus_in(home.path())
        .args(["destroy", "cms-serverless", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("destroyed"));

    stratus_in(home.path())
        .args(["status", "cms-serverless"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not deployed"));
}

#[test]
fn test_deploy_is_idempotent_on_rerun() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "cms-bridge"])
        .assert()
        .success();
    // Re-evaluating the unchanged graph lands on the same resources.
    stratus_in(home.path())
        .args(["deploy", "cms-bridge"])
        .assert()
        .success();
    stratus_in(home.path())
        .args(["destroy", "cms-bridge", "--yes"])
        .assert()
        .success();
}

#[test]
fn test_destroy_without_deployment_names_the_topology() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["destroy", "cms-serverless", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "no recorded deployment for 'cms-serverless'",
        ));
}

#[test]
fn test_deploy_unknown_topology_lists_builtins() {
    let home = tempfile::tempdir().expect("tempdir");
    stratus_in(home.path())
        .args(["deploy", "no-such-topology"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown topology"))
        .stderr(predicate::str::contains("cms-bridge"));
}

#[test]
fn test_deploy_descriptor_with_inverted_bounds_fails_before_provisioning() {
    let home = tempfile::tempdir().expect("tempdir");
    let descriptor = home.path().join("bad.yaml");
    std::fs::write(
        &descriptor,
        r"
name: bad-bounds
network:
  cidr: 10.0.0.0/16
  subnet_groups:
    - name: data
      class: private-isolated
data_tiers:
  - name: database
    kind: relational
    subnet_group: data
    capacity: { min: 2, max: 1 }
",
    )
    .expect("write descriptor");

    stratus_in(home.path())
        .args(["deploy", "--file"])
        .arg(&descriptor)
        .assert()
        .failure()
        .stderr(predicate::str::contains("capacity bounds invalid"));

    // Nothing was provisioned: the inventory was never written.
    assert!(!home.path().join("inventory.json").exists());
}

#[test]
fn test_deploy_custom_descriptor_file_succeeds() {
    let home = tempfile::tempdir().expect("tempdir");
    let descriptor = home.path().join("custom.yaml");
    std::fs::write(
        &descriptor,
        r"
name: custom
network:
  cidr: 192.168.0.0/20
  subnet_groups:
    - name: apps
      class: private-routable
      nat: true
compute_units:
  - name: api
    network_mode: vpc
    subnet_group: apps
    cpu_units: 256
    memory_mib: 512
    containers:
      - name: web
        image: registry.example/api:1
        ports:
          - container_port: 8080
",
    )
    .expect("write descriptor");

    stratus_in(home.path())
        .args(["deploy", "--file"])
        .arg(&descriptor)
        .assert()
        .success()
        .stdout(predicate::str::contains("'custom' deployed"));
}
