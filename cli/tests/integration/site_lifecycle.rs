//! End-to-end site lifecycle against a registry in a temp directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn sitehost(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sitehost"));
    cmd.env("SITEHOST_CONFIG", dir.path().join("config.yaml"))
        .env("NO_COLOR", "1");
    cmd
}

/// Temp dir with `sites.root` pointing at `<dir>/data`.
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    sitehost(&dir)
        .args(["config", "set", "sites.root"])
        .arg(dir.path().join("data"))
        .assert()
        .success();
    dir
}

fn json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = sitehost(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("run");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
#[serial]
fn test_create_status_delete_round_trip() {
    let dir = workspace();
    let data = dir.path().join("data");

    let created = json(&dir, &["create", "contoso"]);
    assert_eq!(created["application"], "contoso");
    let service_url = created["service_url"].as_str().unwrap();
    let site_url = created["site_url"].as_str().unwrap();
    assert!(service_url.starts_with("http://localhost:"));
    assert_ne!(service_url, site_url);
    assert!(
        data.join("apps/contoso/live/wwwroot/index.html").exists(),
        "placeholder page written"
    );

    let status = json(&dir, &["status", "contoso"]);
    let sites = status["sites"].as_array().unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0]["role"], "service");
    assert_eq!(sites[1]["role"], "live");
    assert_eq!(sites[1]["url"], site_url);
    assert_eq!(status["pool"]["state"], "started");

    let deleted = json(&dir, &["delete", "contoso"]);
    assert_eq!(deleted["deleted"], true);
    assert!(!data.join("apps/contoso").exists());
    assert!(data.join("service").exists());

    let status = json(&dir, &["status", "contoso"]);
    assert!(status["sites"].as_array().unwrap().is_empty());
}

#[test]
#[serial]
fn test_developer_site_and_web_root() {
    let dir = workspace();
    json(&dir, &["create", "contoso"]);

    let dev = json(&dir, &["dev", "create", "contoso"]);
    assert_eq!(dev["created"], true);
    assert!(dev["url"].as_str().unwrap().starts_with("http://localhost:"));

    let again = json(&dir, &["dev", "create", "contoso"]);
    assert_eq!(again["created"], false);
    assert!(again["url"].is_null());

    let web_root = json(&dir, &["dev", "webroot", "contoso", "dist"]);
    assert_eq!(web_root["changed"], true);

    let status = json(&dir, &["status", "contoso"]);
    let dev_site = &status["sites"][2];
    assert_eq!(dev_site["role"], "dev");
    let physical = dev_site["physical_path"].as_str().unwrap();
    assert!(
        Path::new(physical).ends_with("apps/contoso/dev/wwwroot/dist"),
        "{physical}"
    );

    json(&dir, &["delete", "contoso"]);
    assert!(!dir.path().join("data/apps/contoso").exists());
}

#[test]
#[serial]
fn test_create_twice_fails_and_keeps_sites() {
    let dir = workspace();
    json(&dir, &["create", "contoso"]);

    sitehost(&dir)
        .args(["create", "contoso"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    let status = json(&dir, &["status", "contoso"]);
    assert_eq!(status["sites"].as_array().unwrap().len(), 2);
}

#[test]
#[serial]
fn test_delete_unknown_application_succeeds() {
    let dir = workspace();
    sitehost(&dir)
        .args(["delete", "ghost", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Application 'ghost' removed"));
}

#[test]
#[serial]
fn test_webroot_without_developer_site_reports_unchanged() {
    let dir = workspace();
    json(&dir, &["create", "contoso"]);

    let web_root = json(&dir, &["dev", "webroot", "contoso", "dist"]);
    assert_eq!(web_root["changed"], false);

    sitehost(&dir)
        .args(["dev", "webroot", "contoso", "../escape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("web-root"));
}
