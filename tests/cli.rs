use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREETING: &str = "DryFruto API";

fn checker() -> Command {
    Command::cargo_bin("dryfruto-checker").unwrap()
}

async fn mount_root(server: &MockServer, message: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": message})))
        .mount(server)
        .await;
}

#[test]
fn help_lists_subcommands() {
    checker()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("site-settings"));
}

#[tokio::test(flavor = "multi_thread")]
async fn check_subcommand_passes_against_healthy_root() {
    let server = MockServer::start().await;
    mount_root(&server, GREETING).await;

    checker()
        .args(["check", "--base-url", &server.uri()])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS"));
}

#[tokio::test(flavor = "multi_thread")]
async fn check_subcommand_fails_against_wrong_backend() {
    let server = MockServer::start().await;
    mount_root(&server, "Some Other API").await;

    checker()
        .args(["check", "--base-url", &server.uri()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_exits_zero_and_writes_report_for_healthy_backend() {
    let settings = json!({
        "bulkOrderProductTypes": ["Nuts", "Dried Fruits", "Spices"],
        "bulkOrderBenefits": ["Bulk discount", "Free delivery above 50kg"],
    });

    let server = MockServer::start().await;
    mount_root(&server, GREETING).await;
    Mock::given(method("GET"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings.clone()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings))
        .mount(&server)
        .await;

    let out = tempfile::tempdir().unwrap();
    checker()
        .args([
            "run",
            "--base-url",
            &server.uri(),
            "--output-dir",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("5/5 checks passed"));

    let report_path = out.path().join("results/report.json");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["total"], 5);
    assert_eq!(report["passed"], 5);
    assert_eq!(report["failed"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_halts_and_exits_one_when_greeting_is_wrong() {
    let server = MockServer::start().await;
    mount_root(&server, "Wrong API").await;
    Mock::given(method("GET"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    checker()
        .args(["run", "--no-report", "--base-url", &server.uri()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("0/1 checks passed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_records_update_failures_but_finishes_the_suite() {
    let settings = json!({
        "bulkOrderProductTypes": ["Nuts"],
        "bulkOrderBenefits": ["Bulk discount"],
    });

    let server = MockServer::start().await;
    mount_root(&server, GREETING).await;
    Mock::given(method("GET"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/site-settings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    checker()
        .args(["run", "--no-report", "--base-url", &server.uri()])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("2/5 checks passed"));
}
