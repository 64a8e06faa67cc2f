// ============================================
// HAPPYHOUR - CLI Integration Tests
// ============================================

use std::process::Command;

use tempfile::tempdir;

fn happyhour() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_happyhour"));
    cmd.env_remove("RUST_LOG").env_remove("HAPPYHOUR_DATA");
    cmd
}

/// Test CLI help command
#[test]
fn test_cli_help() {
    let output = happyhour()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("happyhour"));
    assert!(stdout.contains("--rebuild"));
}

/// Test CLI version command
#[test]
fn test_cli_version() {
    let output = happyhour()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

/// Missing query is a usage error and exits with 1
#[test]
fn test_cli_requires_query() {
    let output = happyhour().output().expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<QUERY>"), "{}", stderr);
}

/// Unknown flags are usage errors too
#[test]
fn test_cli_unknown_flag_fails_with_one() {
    let output = happyhour()
        .args(["--no-such-flag", "wine"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
}

/// Unreadable source file exits with 1 and reports on stderr
#[test]
fn test_cli_missing_data_file_fails() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "[openai]\napi_key = \"sk-test\"\n").unwrap();

    let output = happyhour()
        .current_dir(dir.path())
        .args(["--config"])
        .arg(&config)
        .args(["--data"])
        .arg(dir.path().join("missing.csv"))
        .arg("cozy wine bar")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read source file"), "{}", stderr);
    assert!(!dir.path().join("missing.embeddings.csv").exists());
}
