// ABOUTME: Integration tests for the stackward CLI surface.
// ABOUTME: Validates --help output, argument parsing and usage errors that fail before any runtime access.

use assert_cmd::Command;
use predicates::prelude::*;

fn stackward_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("stackward"))
}

#[test]
fn help_shows_commands() {
    stackward_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("service"))
        .stdout(predicate::str::contains("certificates"));
}

#[test]
fn deploy_help_lists_modes() {
    stackward_cmd()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("prod"))
        .stdout(predicate::str::contains("--skip-modules"));
}

#[test]
fn production_deploy_without_domain_is_usage_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackward_cmd()
        .arg("--project-dir")
        .arg(temp_dir.path())
        .args(["deploy", "prod"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("domain"));

    assert!(!temp_dir.path().join("env").exists());
}

#[test]
fn production_deploy_to_localhost_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackward_cmd()
        .arg("--project-dir")
        .arg(temp_dir.path())
        .args(["deploy", "prod", "localhost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("localhost"));
}

#[test]
fn invalid_domain_is_rejected_before_setup() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackward_cmd()
        .arg("--project-dir")
        .arg(temp_dir.path())
        .args(["deploy", "prod", "not_a.domain"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid character"));

    assert!(!temp_dir.path().join(".stackward-mode").exists());
}

#[test]
fn unknown_mode_fails_to_parse() {
    stackward_cmd()
        .args(["deploy", "staging", "example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn certificates_init_validates_domain() {
    stackward_cmd()
        .args(["certificates", "init", "exa mple.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid character"));
}

#[test]
fn quiet_and_json_conflict() {
    stackward_cmd()
        .args(["--quiet", "--json", "service", "status"])
        .assert()
        .code(1);
}

#[test]
fn json_mode_reports_errors_as_events() {
    let temp_dir = tempfile::tempdir().unwrap();

    stackward_cmd()
        .arg("--json")
        .arg("--project-dir")
        .arg(temp_dir.path())
        .args(["deploy", "prod"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(r#""event":"error""#));
}
