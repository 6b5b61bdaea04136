//! Mock server tests for the request client.
//!
//! These tests use wiremock to simulate the classification service and
//! exercise token handling, retry behavior, and pagination without network
//! access or real credentials.

mod common;

use std::time::Duration;

use common::{mock_client, mount_token_endpoint};
use serde_json::{Value, json};
use sortera::error::{AuthError, TransientError};
use sortera::{ApiClient, Credentials, Error};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Token Handling Tests
// ============================================================================

#[tokio::test]
async fn test_token_fetched_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=test-client-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.get::<Value>("v1/widgets").await.unwrap();
    client.get::<Value>("v1/widgets").await.unwrap();
}

#[tokio::test]
async fn test_token_renewed_ahead_of_expiry() {
    let server = MockServer::start().await;

    // expires_in equal to the renewal margin, so the token is due for
    // renewal the moment it is issued
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "short-lived-token",
            "expires_in": 600
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(2)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    client.get::<Value>("v1/widgets").await.unwrap();
    client.get::<Value>("v1/widgets").await.unwrap();
}

#[tokio::test]
async fn test_rejected_credentials_surface_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.get::<Value>("v1/widgets").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Auth(AuthError::RenewalRejected { status: 401, .. })
    ));
    assert!(err.to_string().contains("invalid_client"));
}

#[tokio::test]
async fn test_401_renews_token_and_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "stale-token",
            "expires_in": 3600
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(header("authorization", "Bearer stale-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let value = client.get::<Value>("v1/widgets").await.unwrap();
    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn test_second_401_is_token_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "never-good-enough",
            "expires_in": 3600
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.get::<Value>("v1/widgets").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::TokenRejected)));
}

#[tokio::test]
async fn test_token_endpoint_outage_is_auth_failure() {
    let server = MockServer::start().await;

    // max_retries is 2, so the exchange is attempted three times
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.get::<Value>("v1/widgets").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Auth(AuthError::RenewalFailed { .. })
    ));
}

// ============================================================================
// Retry Tests
// ============================================================================

#[tokio::test]
async fn test_persistent_503_exhausts_retries() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.get::<Value>("v1/widgets").await.unwrap_err();

    match err {
        Error::Transient(TransientError::RetriesExhausted {
            status,
            attempts,
            body,
        }) => {
            assert_eq!(status, 503);
            assert_eq!(attempts, 3);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_429_then_success() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let value = client.get::<Value>("v1/widgets").await.unwrap();
    assert_eq!(value, json!({"ok": true}));
}

#[tokio::test]
async fn test_client_error_not_retried_and_body_preserved() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "bad batch size"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let err = client.get::<Value>("v1/widgets").await.unwrap_err();

    match err {
        Error::InvalidRequest(err) => {
            assert_eq!(err.status, 400);
            assert!(err.body.contains("bad batch size"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_request_timeout_is_transient() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let mut config = common::test_config();
    config.request_timeout = Duration::from_millis(50);
    config.max_retries = 0;
    let credentials =
        Credentials::with_server_url("test-client-id", "test-client-secret", server.uri()).unwrap();
    let client = ApiClient::with_config(credentials, config);

    let err = client.get::<Value>("v1/widgets").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Transient(TransientError::Network(_))
    ));
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_pagination_follows_next_links() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    // Specific cursors first; the cursorless mock matches everything else
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(query_param("cursor", "p2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["c"]))
                .insert_header(
                    "Link",
                    format!("<{}/v1/widgets?cursor=p3>; rel=\"next\"", server.uri()),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(query_param("cursor", "p3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["a", "b"]))
                .insert_header(
                    "Link",
                    format!("<{}/v1/widgets?cursor=p2>; rel=\"next\"", server.uri()),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let items: Vec<String> = client.get_all("v1/widgets?batchSize=2").await.unwrap();

    assert_eq!(items, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_pagination_stops_on_empty_first_page() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let items: Vec<String> = client.get_all("v1/widgets?batchSize=2").await.unwrap();

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_pagination_stops_without_next_link() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    // A full page, but no Link header: the listing is complete
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a", "b"])))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let items: Vec<String> = client.get_all("v1/widgets?batchSize=2").await.unwrap();

    assert_eq!(items, vec!["a", "b"]);
}
