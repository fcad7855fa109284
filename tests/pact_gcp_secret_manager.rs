//! Pact contract tests for GCP Secret Manager API
//!
//! These tests define the contract between secret-key-sync and the GCP Secret
//! Manager REST API. They drive the real `SecretManagerREST` client against a
//! Pact mock server that simulates GCP Secret Manager responses.

#[allow(dead_code, reason = "Shared helpers are not used by every test binary")]
mod common;

use common::init_rustls;
use pact_consumer::prelude::*;
use secret_key_sync::provider::gcp::SecretManagerREST;
use secret_key_sync::provider::{SecretStore, StoreError};
use serde_json::json;

const CONSUMER: &str = "Secret-Key-Sync";
const PROVIDER: &str = "GCP-Secret-Manager";

/// Client pointed at the mock server with a fixed token
async fn client_for(mock_server: &dyn ValidatingMockServer) -> SecretManagerREST {
    // mock_server.url() returns a Url struct - convert to string and strip trailing slash
    let mut base_url = mock_server.url().to_string();
    if base_url.ends_with('/') {
        base_url.pop();
    }

    SecretManagerREST::new(
        "test-project".to_string(),
        Some(base_url),
        Some("test-token".to_string()),
    )
    .await
    .expect("Failed to create client")
}

#[tokio::test]
async fn test_gcp_access_latest_version_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("access the latest version of a secret", "", |mut i| {
        i.given("a secret exists with at least one version");
        i.request
            .method("GET")
            .path("/v1/projects/test-project/secrets/sequencer-keys/versions/latest:access".to_string())
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/secrets/sequencer-keys/versions/1",
                "payload": {
                    "data": "QT0xCg=="
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&*mock_server).await;

    let payload = client
        .fetch("sequencer-keys", "latest")
        .await
        .expect("Failed to fetch secret");
    assert_eq!(payload, b"A=1\n".to_vec());
}

#[tokio::test]
async fn test_gcp_access_version_without_data_is_empty() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("access a version holding an empty payload", "", |mut i| {
        i.given("a secret exists whose latest version is empty");
        i.request
            .method("GET")
            .path("/v1/projects/test-project/secrets/sequencer-keys/versions/latest:access".to_string())
            .header("authorization", "Bearer test-token");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/secrets/sequencer-keys/versions/1",
                "payload": {}
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&*mock_server).await;

    let payload = client
        .fetch("sequencer-keys", "latest")
        .await
        .expect("Failed to fetch secret");
    assert!(payload.is_empty());
}

#[tokio::test]
async fn test_gcp_add_secret_version_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("add a secret version to an existing secret", "", |mut i| {
        i.given("a secret exists in GCP Secret Manager");
        i.request
            .method("POST")
            .path("/v1/projects/test-project/secrets/sequencer-keys:addVersion".to_string())
            .header("authorization", "Bearer test-token")
            .header("content-type", "application/json")
            .json_body(json!({
                "payload": {
                    "data": "QT0xCkI9Mgo="
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "name": "projects/test-project/secrets/sequencer-keys/versions/2",
                "createTime": "2024-01-01T00:00:00Z",
                "state": "ENABLED"
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&*mock_server).await;

    client
        .add_version("sequencer-keys", b"A=1\nB=2\n")
        .await
        .expect("Failed to add secret version");
}

#[tokio::test]
async fn test_gcp_secret_not_found_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("access a secret that does not exist", "", |mut i| {
        i.given("the secret does not exist");
        i.request
            .method("GET")
            .path("/v1/projects/test-project/secrets/missing-secret/versions/latest:access".to_string())
            .header("authorization", "Bearer test-token");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 404,
                    "message": "Secret [projects/test-project/secrets/missing-secret] not found or has no versions.",
                    "status": "NOT_FOUND"
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&*mock_server).await;

    let err = client
        .fetch("missing-secret", "latest")
        .await
        .expect_err("Missing secret should be an error");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_gcp_permission_denied_on_add_version_contract() {
    init_rustls();
    let mut pact_builder = PactBuilder::new(CONSUMER, PROVIDER);

    pact_builder.interaction("add a version without permission", "", |mut i| {
        i.given("the caller lacks secretmanager.versions.add");
        i.request
            .method("POST")
            .path("/v1/projects/test-project/secrets/sequencer-keys:addVersion".to_string())
            .header("authorization", "Bearer test-token");
        i.response
            .status(403)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": 403,
                    "message": "Permission 'secretmanager.versions.add' denied",
                    "status": "PERMISSION_DENIED"
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = client_for(&*mock_server).await;

    let err = client
        .add_version("sequencer-keys", b"A=1\n")
        .await
        .expect_err("Write without permission should be an error");
    assert!(matches!(err, StoreError::PermissionDenied(_)));
}
