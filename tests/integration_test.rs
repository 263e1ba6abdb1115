/// Integration tests for the revisar binary
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A repository where every rule passes: a test job guarded by change
/// paths that match real files, and no Go sources or secret calls.
fn write_compliant_repo(temp: &TempDir) {
    let root = temp.path();
    fs::create_dir_all(root.join(".gitlab/e2e")).unwrap();
    fs::create_dir_all(root.join("pkg/util")).unwrap();
    fs::create_dir_all(root.join("test/new-e2e")).unwrap();
    fs::write(
        root.join(".gitlab-ci.yml"),
        "include:\n  - .gitlab/e2e/e2e.yml\n",
    )
    .unwrap();
    fs::write(
        root.join(".gitlab/e2e/e2e.yml"),
        r"
new-e2e-agent:
  rules:
    - changes:
        paths:
          - pkg/**/*
          - test/new-e2e/**/*
  script:
    - ./run.sh
",
    )
    .unwrap();
    fs::write(root.join("pkg/util/README.md"), "# util\n").unwrap();
    fs::write(root.join("test/new-e2e/config.yaml"), "suite: agent\n").unwrap();
}

#[test]
fn test_check_compliant_repo_passes() {
    let temp = TempDir::new().unwrap();
    write_compliant_repo(&temp);

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed"));
}

#[test]
fn test_check_flags_test_only_job() {
    let temp = TempDir::new().unwrap();
    write_compliant_repo(&temp);
    fs::write(
        temp.path().join(".gitlab/e2e/e2e.yml"),
        r"
new-e2e-agent:
  rules:
    - changes:
        paths:
          - test/new-e2e/**/*
  script:
    - ./run.sh
",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("JOB-001").not())
        .stderr(predicate::str::contains("JOB-001"))
        .stderr(predicate::str::contains(".gitlab/e2e/e2e.yml"))
        .stderr(predicate::str::contains(
            "tests without required change paths rule: new-e2e-agent",
        ));
}

#[test]
fn test_check_allow_listed_job_passes_with_section() {
    let temp = TempDir::new().unwrap();
    write_compliant_repo(&temp);
    fs::write(
        temp.path().join(".gitlab/e2e/e2e.yml"),
        "new-e2e-agent:\n  script:\n    - ./run.sh\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("revisar.yaml"),
        "ci:\n  allow_list:\n    - new-e2e-agent\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Allow-listed jobs"))
        .stdout(predicate::str::contains("new-e2e-agent"));
}

#[test]
fn test_check_list_rules() {
    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg("--list-rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("job-change-paths"))
        .stdout(predicate::str::contains("change-path-globs"))
        .stdout(predicate::str::contains("copyright-headers"))
        .stdout(predicate::str::contains("filenames"))
        .stdout(predicate::str::contains("secret-wrappers"));
}

#[test]
fn test_check_json_output_is_valid() {
    let temp = TempDir::new().unwrap();
    write_compliant_repo(&temp);
    fs::write(
        temp.path().join(".gitlab/e2e/e2e.yml"),
        "new-e2e-agent:\n  script:\n    - ./run.sh\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    let assert = cmd
        .arg("check")
        .arg(temp.path())
        .arg("--format")
        .arg("json")
        .assert()
        .failure();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&stdout).expect("report should be valid JSON");
    assert!(report["summary"]["failed_checks"].as_u64().unwrap() >= 1);
}

#[test]
fn test_check_single_rule_filenames() {
    let temp = TempDir::new().unwrap();
    let long_name = format!("{}.txt", "x".repeat(120));
    fs::write(temp.path().join(&long_name), "data\n").unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .arg("--rule")
        .arg("filenames")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FN-002"))
        .stderr(predicate::str::contains("characters too many"));
}

#[test]
fn test_check_unknown_rule_reported() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .arg("--rule")
        .arg("does-not-exist")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Unknown rule: does-not-exist"));
}

#[test]
fn test_check_dry_run_previews_header_fix() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.go"), "package main\n").unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .arg("--dry-run")
        .assert()
        .failure()
        .stdout(predicate::str::contains("DRY-RUN"));

    // Nothing was written.
    let content = fs::read_to_string(temp.path().join("main.go")).unwrap();
    assert_eq!(content, "package main\n");
}

#[test]
fn test_check_fix_inserts_header() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("main.go"), "package main\n").unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("check")
        .arg(temp.path())
        .arg("--fix")
        .assert()
        .success()
        .stdout(predicate::str::contains("FIXED"));

    let content = fs::read_to_string(temp.path().join("main.go")).unwrap();
    assert!(content.starts_with("// Unless explicitly stated"));
    assert!(content.contains("package main"));
}

#[test]
fn test_secrets_inventory_grouped_by_owner() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".gitlab-ci.yml"),
        "\
variables:
  AGENT_API_KEY_SSM_NAME: ci.datadog-agent.api_key  # agent-ci
  AGENT_APP_KEY_SSM_KEY: ci.datadog-agent.app_key  # agent-ci
  TOOLING_TOKEN_SSM_NAME: ci.tooling.token  # tooling
",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("secrets")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Owner:agent-ci"))
        .stdout(predicate::str::contains("  - ci.datadog-agent.api_key"))
        .stdout(predicate::str::contains("Owner:tooling"));
}

#[test]
fn test_secrets_json_format() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(".gitlab-ci.yml"),
        "  AGENT_API_KEY_SSM_NAME: ci.datadog-agent.api_key  # agent-ci\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    let assert = cmd
        .arg("secrets")
        .arg(temp.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let owners: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(owners["agent-ci"][0], "ci.datadog-agent.api_key");
}

#[test]
fn test_secrets_missing_entry_point_fails() {
    let temp = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("revisar").unwrap();
    cmd.arg("secrets")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
