//! End-to-end CLI tests for the indexmirror binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_single_file_tree(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(
            json!({"action": "get", "items": {"href": "/docs/", "what": 1}}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"items": [{"href": "/docs/a.txt", "time": 1577872800000u64, "size": 5}]}),
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/a.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_mirrors_a_tree_end_to_end() {
    let server = MockServer::start().await;
    mount_single_file_tree(&server).await;

    let scratch = TempDir::new().unwrap();
    let manifest = scratch.path().join("urls.txt");
    let output = scratch.path().join("downloads");

    Command::cargo_bin("indexmirror")
        .unwrap()
        .arg(format!("{}/docs/", server.uri()))
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output-dir")
        .arg(&output)
        .arg("-c")
        .arg("2")
        .assert()
        .success();

    let downloaded = std::fs::read(output.join("docs/a.txt")).unwrap();
    assert_eq!(downloaded, b"hello");

    let recorded = std::fs::read_to_string(&manifest).unwrap();
    assert_eq!(recorded, format!("{}/docs/a.txt\n", server.uri()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_manifest_only_writes_no_files() {
    let server = MockServer::start().await;
    mount_single_file_tree(&server).await;

    let scratch = TempDir::new().unwrap();
    let manifest = scratch.path().join("urls.txt");
    let output = scratch.path().join("downloads");

    Command::cargo_bin("indexmirror")
        .unwrap()
        .arg(format!("{}/docs/", server.uri()))
        .arg("--manifest-only")
        .arg("--manifest")
        .arg(&manifest)
        .arg("--output-dir")
        .arg(&output)
        .assert()
        .success();

    assert!(!output.exists());
    let recorded = std::fs::read_to_string(&manifest).unwrap();
    assert!(recorded.contains("/docs/a.txt"));
}

#[test]
fn test_cli_rejects_non_http_url() {
    Command::cargo_bin("indexmirror")
        .unwrap()
        .arg("ftp://example.com/docs/")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http"));
}

#[test]
fn test_cli_fails_when_manifest_cannot_be_created() {
    let scratch = TempDir::new().unwrap();

    Command::cargo_bin("indexmirror")
        .unwrap()
        .arg("http://127.0.0.1:9/docs/")
        .arg("--manifest")
        .arg(scratch.path().join("missing-dir/urls.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("manifest"));
}
