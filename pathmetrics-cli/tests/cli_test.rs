use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pathmetrics_cmd() -> Command {
    Command::cargo_bin("pathmetrics").unwrap()
}

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("root/data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("part-0"), b"0123456789").unwrap();
    fs::write(data.join("part-1"), b"01234").unwrap();
    fs::write(
        dir.path().join("metrics.json"),
        r#"{
            "properties": { "dir": "/data" },
            "paths": [
                { "name": "daily", "value": "<%=dir%>/*", "tags": { "env": "prod" } },
                { "name": "3bad", "value": "/data" }
            ]
        }"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_report_to_stdout() {
    let dir = workspace();
    pathmetrics_cmd()
        .arg("-f")
        .arg(dir.path().join("root"))
        .arg(dir.path().join("metrics.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("daily (/data/*)\n"))
        .stdout(predicate::str::contains("\tcount (env=prod): 2\n"))
        .stdout(predicate::str::contains("\tsumSize (env=prod): 15\n"))
        .stdout(predicate::str::contains("\tmaxSize (env=prod): 10\n"))
        .stdout(predicate::str::contains("3bad (error: Invalid path name: '3bad')"));
}

#[test]
fn test_report_to_file() {
    let dir = workspace();
    let output = dir.path().join("report.txt");
    pathmetrics_cmd()
        .arg("-f")
        .arg(dir.path().join("root"))
        .arg("-o")
        .arg(&output)
        .arg("--workers")
        .arg("4")
        .arg(dir.path().join("metrics.json"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let report = fs::read_to_string(output).unwrap();
    assert!(report.starts_with("daily (/data/*)\n"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    pathmetrics_cmd()
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unknown_time_zone_fails() {
    let dir = workspace();
    pathmetrics_cmd()
        .arg("--time-zone")
        .arg("Mars/Olympus")
        .arg(dir.path().join("metrics.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mars/Olympus"));
}

#[test]
fn test_config_is_required() {
    pathmetrics_cmd().assert().failure();
}
