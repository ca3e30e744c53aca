//! CLI options interaction tests
//!
//! Every run points at loopback addresses so nothing leaves the machine.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use std::net::TcpListener;
use std::process::Command;
use tempfile::TempDir;

const MANAGED_VARS: &[&str] = &[
    "CHECK_TIMEOUT_SECONDS",
    "PORT_TIMEOUT_MS",
    "CHECK_PORTS",
    "DIAGNOSTIC_DEADLINE_SECONDS",
    "MAX_CONCURRENCY",
    "IPINFO_TOKEN",
    "ISP_LOOKUP_URL",
    "DNS_SERVERS",
    "THROUGHPUT_MAX_BYTES",
    "ENABLE_COLOR",
];

/// Command running in an empty directory with a clean environment
fn create_test_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ccheck").unwrap();
    cmd.current_dir(dir.path());
    for var in MANAGED_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// A loopback port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn loopback_args(port: u16) -> Vec<String> {
    vec![
        "--dns-servers".to_string(),
        "127.0.0.1".to_string(),
        "--isp-lookup-url".to_string(),
        format!("http://127.0.0.1:{}", closed_port()),
        "--ports".to_string(),
        port.to_string(),
        "--timeout".to_string(),
        "2".to_string(),
        "--port-timeout-ms".to_string(),
        "500".to_string(),
        format!("http://127.0.0.1:{}", port),
    ]
}

#[test]
fn test_help_output() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ports"))
        .stdout(predicate::str::contains("--dns-servers"));
}

#[test]
fn test_env_help() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("IPINFO_TOKEN"))
        .stdout(predicate::str::contains("Configuration Priority"));
}

#[test]
fn test_missing_target_rejected() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir).assert().failure();
}

#[test]
fn test_invalid_address_exit_code() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--dns-servers", "127.0.0.1", "not a valid url 😀"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid address"))
        .stderr(predicate::str::contains("Address help:"));
}

#[test]
fn test_invalid_port_list_is_config_error() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--ports", "80,0", "example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration"));
}

#[test]
fn test_oversized_deadline_rejected() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--deadline", "18446744073709551615", "example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Deadline must be between"));

    create_test_cmd(&dir)
        .env("DIAGNOSTIC_DEADLINE_SECONDS", "18446744073709551615")
        .args(["--dns-servers", "127.0.0.1", "example.com"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("at most 3600"));
}

#[test]
fn test_conflicting_color_flags() {
    let dir = TempDir::new().unwrap();
    create_test_cmd(&dir)
        .args(["--color", "--no-color", "example.com"])
        .assert()
        .failure();
}

#[test]
fn test_json_report_against_closed_port() {
    let dir = TempDir::new().unwrap();
    let port = closed_port();

    let output = create_test_cmd(&dir)
        .args(loopback_args(port))
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = report["outcomes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|outcome| outcome["name"].as_str().unwrap())
        .collect();
    let port_name = format!("Port {}", port);
    assert_eq!(
        names,
        vec![
            "DNS Resolution",
            "HTTP Connection",
            "SNI Check",
            "WebSocket Check",
            "Tunnel Feasibility",
            "ISP Check",
            port_name.as_str(),
            "Throughput Estimate",
        ]
    );

    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes[0]["success"], true);
    assert_eq!(outcomes[1]["success"], false);
    assert_eq!(outcomes[2]["status"], "not_applicable");
    assert_eq!(outcomes[5]["success"], false);
    assert_eq!(outcomes[6]["success"], false);
    assert!(outcomes[6]["detail"].as_str().unwrap().contains("closed"));
    assert_eq!(outcomes[4]["approximate"], true);
    for outcome in outcomes {
        assert!(!outcome["detail"].as_str().unwrap().is_empty());
    }
}

#[test]
fn test_plain_text_report() {
    let dir = TempDir::new().unwrap();
    let port = closed_port();

    create_test_cmd(&dir)
        .args(loopback_args(port))
        .args(["--format", "text", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Diagnostics for http://127.0.0.1:{}", port)))
        .stdout(predicate::str::contains("[PASS   ] DNS Resolution"))
        .stdout(predicate::str::contains("[N/A    ] SNI Check"))
        .stdout(predicate::str::contains(format!("Port {} is closed.", port)));
}

#[test]
fn test_plain_summary_line() {
    let dir = TempDir::new().unwrap();
    let output = create_test_cmd(&dir)
        .args(loopback_args(closed_port()))
        .args(["--format", "text", "--no-color"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = stdout.trim_end().lines().last().unwrap_or_default();
    let pattern = Regex::new(r"^\d+ passed, \d+ failed, \d+ not applicable in \d+(\.\d)?(ms|s)$").unwrap();
    assert!(pattern.is_match(summary), "unexpected summary line: {}", summary);
}

#[test]
fn test_env_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "CHECK_PORTS=80,80\n").unwrap();

    // Duplicate ports from the .env file must be rejected
    create_test_cmd(&dir)
        .args(["--dns-servers", "127.0.0.1", "example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("more than once"));
}
