//! CLI integration tests

use std::process::Command;

fn wmlp() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wmlp"))
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = wmlp()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Machine Failure Predictor"),
        "Should show app name"
    );
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("config"), "Should show config command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = wmlp()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("wmlp"), "Should show binary name");
}

/// Test predict subcommand help lists every sensor flag
#[test]
fn test_predict_help() {
    let output = wmlp()
        .args(["predict", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    for flag in [
        "--type",
        "--air-temp",
        "--process-temp",
        "--rpm",
        "--torque",
        "--tool-wear",
    ] {
        assert!(stdout.contains(flag), "Should show {} option", flag);
    }
}

/// Test that predict rejects a missing sensor value before any request
#[test]
fn test_predict_missing_argument() {
    let output = wmlp()
        .args(["predict", "--type", "L", "--air-temp", "298.1"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Should fail without all readings");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--process-temp"), "Should name missing option");
}

/// Test that an unknown machine type is rejected
#[test]
fn test_predict_invalid_machine_type() {
    let output = wmlp()
        .args([
            "predict",
            "--type",
            "X",
            "--air-temp",
            "298.1",
            "--process-temp",
            "308.6",
            "--rpm",
            "1551",
            "--torque",
            "42.8",
            "--tool-wear",
            "0",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Should reject machine type X");
}

/// Test config subcommand help
#[test]
fn test_config_help() {
    let output = wmlp()
        .args(["config", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Config help should succeed");
    assert!(stdout.contains("set-url"), "Should show set-url command");
    assert!(stdout.contains("set-format"), "Should show set-format command");
}

/// Test that an unreachable proxy produces a non-zero exit
#[test]
fn test_health_unreachable_proxy() {
    let output = wmlp()
        .args(["--api-url", "http://127.0.0.1:1", "health"])
        .env("HOME", std::env::temp_dir())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Should fail when proxy is down");
}
