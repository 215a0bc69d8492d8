//! Integration tests for the stratus CLI skeleton
//!
//! These tests verify the CLI structure and argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn stratus() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stratus"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    stratus().assert().code(2).stderr(predicate::str::contains(
        "Dependency-ordered provisioning",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    stratus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    stratus()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stratus"));
}

#[test]
fn test_version_command_shows_version() {
    stratus()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stratus 0.3.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    stratus()
        .arg("version")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version": "0.3.0""#));
}

// --- Command hierarchy tests ---

#[test]
fn test_help_shows_deploy_command() {
    stratus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn test_help_shows_destroy_command() {
    stratus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("destroy"));
}

#[test]
fn test_help_shows_status_command() {
    stratus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("status"));
}

// --- Global flags tests ---

#[test]
fn test_global_json_flag_accepted() {
    stratus()
        .args(["--json", "version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""version":"#));
}

#[test]
fn test_global_quiet_flag_accepted() {
    stratus().args(["--quiet", "version"]).assert().success();
}

#[test]
fn test_global_no_color_flag_accepted() {
    stratus().args(["--no-color", "version"]).assert().success();
}

#[test]
fn test_no_color_env_var_accepted() {
    // NO_COLOR env var should be accepted with any truthy value
    stratus()
        .env("NO_COLOR", "true")
        .arg("version")
        .assert()
        .success();
}

// --- Error handling tests ---

#[test]
fn test_unknown_command_exits_with_error() {
    stratus()
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// --- Subcommand argument tests ---

#[test]
fn test_deploy_requires_topology_or_file() {
    stratus()
        .arg("deploy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_deploy_rejects_topology_and_file_together() {
    stratus()
        .args(["deploy", "cms-bridge", "--file", "x.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_destroy_requires_topology() {
    stratus()
        .arg("destroy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}
