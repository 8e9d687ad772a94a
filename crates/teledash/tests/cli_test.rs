//! Integration tests for the `teledash` CLI binary.
//!
//! Argument parsing, help output, completions and the theme context run
//! without a bridge; bridge-bound commands run against wiremock.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

const MISSING_HOME: &str = "/tmp/teledash-cli-test-nonexistent";

/// Build a [`Command`] for the `teledash` binary with env isolation.
///
/// Clears all `TELEDASH_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn teledash_cmd_in(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("teledash");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TELEDASH_PROFILE")
        .env_remove("TELEDASH_BRIDGE")
        .env_remove("TELEDASH_OUTPUT")
        .env_remove("TELEDASH_COLOR")
        .env_remove("TELEDASH_TIMEOUT")
        .env_remove("TELEDASH_UI__THEME");
    cmd
}

fn teledash_cmd() -> assert_cmd::Command {
    teledash_cmd_in(Path::new(MISSING_HOME))
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a bridge-bound command off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    tokio::task::spawn_blocking(move || {
        teledash_cmd()
            .arg("--bridge")
            .arg(uri)
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = teledash_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    teledash_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("telemetry bridge")
            .and(predicate::str::contains("settings"))
            .and(predicate::str::contains("packets"))
            .and(predicate::str::contains("live")),
    );
}

#[test]
fn test_version_flag() {
    teledash_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("teledash"));
}

#[test]
fn test_unknown_service_is_usage_error() {
    let output = teledash_cmd().args(["restart", "tcp"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_live_count_zero_is_usage_error() {
    let output = teledash_cmd()
        .args(["live", "--count", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--count"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    teledash_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Local config ────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    let home = tempfile::tempdir().unwrap();
    teledash_cmd_in(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_theme_defaults_to_dark() {
    teledash_cmd()
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn test_theme_toggle_persists() {
    let home = tempfile::tempdir().unwrap();

    teledash_cmd_in(home.path())
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("light"));

    teledash_cmd_in(home.path())
        .args(["theme", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""theme": "light""#));

    teledash_cmd_in(home.path())
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));
}

#[test]
fn test_missing_named_profile_is_not_found() {
    let output = teledash_cmd()
        .args(["--profile", "nope", "version"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

#[test]
fn test_invalid_bridge_url_is_usage_error() {
    let output = teledash_cmd()
        .args(["--bridge", "not a url", "version"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Bridge-bound commands ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_version_reports_bridge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "v2.0.1"})))
        .mount(&server)
        .await;

    let output = run_against(&server, &["version", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "v2.0.1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_packets_list_is_sorted_with_labels() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/packet-forwarding"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"6": false, "10": true, "0": true})),
        )
        .mount(&server)
        .await;

    let output = run_against(&server, &["packets", "list", "-o", "plain"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "0\n6\n10");

    let output = run_against(&server, &["packets", "list"]).await;
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Car Telemetry"), "{stdout}");
    assert!(stdout.contains("Car Damage"), "{stdout}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_packets_toggle_saves_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/packet-forwarding"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"0": true, "6": false})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/packet-forwarding"))
        .and(body_json(json!({"0": false, "6": true})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["packets", "toggle", "0", "6"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_osc_key_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/osc-addresses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Speed": { "address": "/car/speed", "type": "float", "enabled": true }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/osc-addresses"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["osc", "toggle", "Boost"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("osc list"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restart_failure_exits_nonzero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/restart/udp"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["restart", "udp"]).await;
    assert_eq!(output.status.code(), Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_settings_set_rejects_bad_port() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "udp_addr": "0.0.0.0", "udp_port": 20777,
            "osc_addr": "127.0.0.1", "osc_port": 9000, "enable_osc": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run_against(&server, &["settings", "set", "udp_port=70000"]).await;
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_bridge_exits_connection() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let output = teledash_cmd()
        .args(["--bridge", &format!("http://{addr}"), "version"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
