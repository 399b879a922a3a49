//! Command-line behaviour of the `obsbox` binary.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const VALID: &str = r"
instances:
  clocks:
    tick: {type: periodic, interval: 1s}
  sources:
    requests:
      type: random_int
      min: 0
      max: 10
      clock: {instance: tick}
metrics:
  - name: requests_total
    type: counter
    description: Requests served
    attributes: {service: api}
    value:
      source: {instance: requests}
      transforms: [accumulate]
  - name: requests_recent
    type: gauge
    description: Requests since the last scrape
    value:
      source: {instance: requests}
      transforms: [accumulate]
      reset: on_read
";

fn config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

fn obsbox() -> Command {
    let mut cmd = Command::cargo_bin("obsbox").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("OBSBOX_CONFIG");
    cmd
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_summarizes_a_valid_config() {
    let file = config(VALID);
    obsbox()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "configuration OK: 2 metrics, 2 instances (1 clocks, 1 sources, 0 values)",
        ))
        .stdout(predicate::str::contains(
            "runtime graph: 1 clocks, 1 sources, 2 values",
        ));
}

#[test]
fn check_print_emits_resolved_yaml() {
    let file = config(VALID);
    obsbox()
        .args(["check", "--print", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("prometheus_name: requests_total"))
        .stdout(predicate::str::contains("source_ref: requests"))
        .stdout(predicate::str::contains("interval: 1s"));
}

#[test]
fn missing_file_is_reported() {
    obsbox()
        .args(["--config", "/nonexistent/obsbox.yaml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn resolution_error_shows_the_chain() {
    let file = config(&VALID.replace("{instance: requests}\n      transforms: [accumulate]\n      reset", "{instance: nope}\n      transforms: [accumulate]\n      reset"));
    obsbox()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("source instance \"nope\" not found"))
        .stderr(predicate::str::contains("in metric \"requests_recent\""));
}

#[test]
fn graph_errors_fail_the_check() {
    let file = config(&VALID.replace("min: 0\n      max: 10", "min: 10\n      max: 0"));
    obsbox()
        .arg("--config")
        .arg(file.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to build runtime graph"))
        .stderr(predicate::str::contains("invalid bounds: min 10 > max 0"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_rejects_invalid_config_before_starting() {
    let file = config("metrics: []\n");
    obsbox()
        .arg("--config")
        .arg(file.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one metric must be defined"));
}

#[test]
fn run_reports_clocks_that_cannot_start() {
    let file = config(&VALID.replace("interval: 1s", "interval: 500000000000y"));
    obsbox()
        .arg("--config")
        .arg(file.path())
        .arg("run")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to start clock"))
        .stderr(predicate::str::contains("too long to schedule"));
}

#[test]
fn zero_report_interval_is_a_usage_error() {
    let file = config(VALID);
    obsbox()
        .arg("--config")
        .arg(file.path())
        .args(["run", "--report-interval", "0s"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("interval must be greater than zero"));
}

#[test]
fn unknown_log_format_is_a_usage_error() {
    obsbox()
        .args(["--log-format", "xml", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'xml'"));
}
