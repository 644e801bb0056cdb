//! Integration tests for `login`, `whoami` and `logout`.
//!
//! The random-user service is replaced by a wiremock server pointed to via
//! DIALTONE_API_URL; the stored session lives under a temp DIALTONE_HOME.


use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use fixtures::random_user_response;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a temp DIALTONE_HOME directory for test isolation.
fn temp_dialtone_home() -> TempDir {
    TempDir::new().expect("create temp dialtone home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api/", server.uri())
}

#[tokio::test]
async fn test_login_whoami_logout_flow() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_dialtone_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("results", "1"))
        .and(query_param("nat", "us"))
        .respond_with(random_user_response("uuid-jane", "Jane", "Doe"))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "09123456789"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as Jane Doe"));

    let storage = fs::read_to_string(home.path().join("storage.json")).unwrap();
    let slots: serde_json::Value = serde_json::from_str(&storage).unwrap();
    let record: serde_json::Value =
        serde_json::from_str(slots["auth_user"].as_str().unwrap()).unwrap();
    assert_eq!(record["id"], "uuid-jane");
    assert_eq!(record["name"]["first"], "Jane");
    assert_eq!(record["location"]["country"], "United States");

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Doe"))
        .stdout(predicate::str::contains("jane.doe@example.com"))
        .stdout(predicate::str::contains("Springfield, Illinois, United States"));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[tokio::test]
async fn test_login_failure_reports_auth_error() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_dialtone_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "09123456789"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Authentication failed. Please verify your phone number and try again.",
        ));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in."));
}

#[tokio::test]
async fn test_failed_login_keeps_existing_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_dialtone_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(random_user_response("uuid-jane", "Jane", "Doe"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "09123456789"])
        .assert()
        .success();

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "09987654321"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Doe"));
}

#[tokio::test]
async fn test_invalid_phone_never_hits_network() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_dialtone_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(random_user_response("uuid-jane", "Jane", "Doe"))
        .expect(0)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Please enter a valid mobile number (09XXXXXXXXX)",
        ));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Phone number is required"));
}

#[tokio::test]
async fn test_logout_and_whoami_ignore_bad_api_url() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_dialtone_home();
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(random_user_response("uuid-jane", "Jane", "Doe"))
        .expect(1)
        .mount(&mock_server)
        .await;

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", api_url(&mock_server))
        .args(["login", "--phone", "09123456789"])
        .assert()
        .success();

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", "not a url")
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Doe"));

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .env("DIALTONE_API_URL", "not a url")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    let storage = fs::read_to_string(home.path().join("storage.json")).unwrap();
    let slots: serde_json::Value = serde_json::from_str(&storage).unwrap();
    assert!(slots.get("auth_user").is_none());
}

#[test]
fn test_dashboard_requires_terminal() {
    let home = temp_dialtone_home();

    cargo_bin_cmd!("dialtone")
        .env("DIALTONE_HOME", home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
