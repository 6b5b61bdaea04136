use std::time::Duration;

use serde_json::json;
use sortera::{ApiClient, ClientConfig, Credentials};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Configuration with short delays so retry and wait loops finish quickly.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        request_timeout: Duration::from_secs(5),
        max_retries: 2,
        retry_base_delay: Duration::from_millis(10),
        page_size: 1000,
        max_concurrent_requests: 4,
        resource_poll_interval: Duration::from_millis(10),
        resource_wait_timeout: Duration::from_millis(500),
        model_poll_interval: Duration::from_millis(10),
        model_wait_timeout: Duration::from_millis(500),
    }
}

/// Client pointed at the mock server.
pub fn mock_client(server: &MockServer) -> ApiClient {
    let credentials =
        Credentials::with_server_url("test-client-id", "test-client-secret", server.uri()).unwrap();
    ApiClient::with_config(credentials, test_config())
}

/// Mount a token endpoint handing out one long-lived token.
pub async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/connect/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-access-token",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}
