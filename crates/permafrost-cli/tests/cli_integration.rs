//! CLI subprocess integration tests.
//!
//! These tests invoke the `permafrost` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability. The mock installer
//! pair is selected through the environment so no Python toolchain is
//! required.

use std::fs;
use std::path::Path;
use std::process::Command;

fn permafrost_bin(project: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_permafrost"));
    // Mock builder and installer: no interpreter needed
    cmd.env("PERMAFROST_INSTALLER", "mock");
    cmd.current_dir(project);
    cmd
}

fn write_requirements(dir: &Path, content: &str) {
    fs::write(dir.join("requirements.txt"), content).unwrap();
}

#[test]
fn cli_version_exits_zero() {
    let project = tempfile::tempdir().unwrap();
    let output = permafrost_bin(project.path())
        .arg("--version")
        .output()
        .unwrap();
    assert!(output.status.success(), "permafrost --version must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("permafrost"),
        "version output must contain 'permafrost': {stdout}"
    );
}

#[test]
fn cli_help_lists_commands() {
    let project = tempfile::tempdir().unwrap();
    let output = permafrost_bin(project.path())
        .arg("--help")
        .output()
        .unwrap();
    assert!(output.status.success(), "permafrost --help must exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("setup"), "help must list 'setup' command");
    assert!(
        stdout.contains("download"),
        "help must list 'download' command"
    );
    assert!(
        stdout.contains("completions"),
        "help must list 'completions' command"
    );
}

#[test]
fn bare_invocation_defaults_to_setup() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let output = permafrost_bin(project.path()).output().unwrap();
    assert!(
        output.status.success(),
        "bare invocation must run setup: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project.path().join("requirements.freeze").is_file());
    assert!(project
        .path()
        .join("venv")
        .join("requirements.sha256")
        .is_file());
}

#[test]
fn second_setup_reports_up_to_date() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let first = permafrost_bin(project.path()).arg("setup").output().unwrap();
    assert!(first.status.success());
    assert!(String::from_utf8_lossy(&first.stdout).contains("rebuilt"));

    let second = permafrost_bin(project.path()).arg("setup").output().unwrap();
    assert!(second.status.success());
    assert!(String::from_utf8_lossy(&second.stdout).contains("up to date"));
}

#[test]
fn setup_json_payload_reports_the_outcome() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let output = permafrost_bin(project.path())
        .args(["--json", "setup"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["outcome"], "rebuilt");
    assert_eq!(payload["env_dir"], "venv");

    let again = permafrost_bin(project.path())
        .args(["--json", "setup"])
        .output()
        .unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&again.stdout).unwrap();
    assert_eq!(payload["outcome"], "reused");
}

#[test]
fn custom_env_path_is_honored() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let output = permafrost_bin(project.path())
        .args(["-p", "envs/dev", "setup"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(project
        .path()
        .join("envs/dev")
        .join("requirements.sha256")
        .is_file());
}

#[test]
fn setup_without_requirements_fails() {
    let project = tempfile::tempdir().unwrap();

    let output = permafrost_bin(project.path()).arg("setup").output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no requirement files"),
        "stderr must explain the failure: {stderr}"
    );
}

#[test]
fn download_before_setup_exits_cleanly() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let output = permafrost_bin(project.path())
        .arg("download")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "missing freeze is not a hard failure"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not frozen"),
        "stderr must mention the missing freeze: {stderr}"
    );
    assert!(!project.path().join("requirements").exists());
}

#[test]
fn download_after_setup_fills_the_cache() {
    let project = tempfile::tempdir().unwrap();
    write_requirements(project.path(), "foo==1.0\n");

    let setup = permafrost_bin(project.path()).arg("setup").output().unwrap();
    assert!(setup.status.success());

    let download = permafrost_bin(project.path())
        .arg("download")
        .output()
        .unwrap();
    assert!(
        download.status.success(),
        "{}",
        String::from_utf8_lossy(&download.stderr)
    );
    assert!(project
        .path()
        .join("requirements")
        .join("foo-1.0.tar.gz")
        .is_file());
}

#[test]
fn completions_generate_for_bash() {
    let project = tempfile::tempdir().unwrap();
    let output = permafrost_bin(project.path())
        .args(["completions", "bash"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("permafrost"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let project = tempfile::tempdir().unwrap();
    let output = permafrost_bin(project.path())
        .arg("thaw")
        .output()
        .unwrap();
    assert!(!output.status.success());
}
