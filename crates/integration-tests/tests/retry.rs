mod harness;

use axum::http::StatusCode;
use harness::PIXEL;
use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use harness::server::{TestClient, result_text};
use serde_json::json;

#[tokio::test]
async fn transient_failures_are_retried() {
    let mock = MockLlm::start_failing(2, StatusCode::INTERNAL_SERVER_ERROR).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_max_retries(3).build();
    let client = TestClient::start(&config).await.unwrap();

    let result = client
        .call("summarize_image", json!({ "image_url": PIXEL }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    assert_eq!(mock.completion_count(), 3);
}

#[tokio::test]
async fn retries_are_exhausted_after_max_retries() {
    let mock = MockLlm::start_failing(10, StatusCode::SERVICE_UNAVAILABLE).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_max_retries(3).build();
    let client = TestClient::start(&config).await.unwrap();

    let result = client
        .call("summarize_image", json!({ "image_url": PIXEL }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(result_text(&result), "Error: upstream error: mock server intentional failure");
    assert_eq!(mock.completion_count(), 4);
}

#[tokio::test]
async fn rate_limits_are_retried() {
    let mock = MockLlm::start_failing(1, StatusCode::TOO_MANY_REQUESTS).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_max_retries(1).build();
    let client = TestClient::start(&config).await.unwrap();

    let result = client
        .call("summarize_image", json!({ "image_url": PIXEL }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    assert_eq!(mock.completion_count(), 2);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mock = MockLlm::start_failing(10, StatusCode::NOT_FOUND).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_max_retries(3).build();
    let client = TestClient::start(&config).await.unwrap();

    let result = client
        .call("summarize_image", json!({ "image_url": PIXEL }))
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(true));
    assert_eq!(mock.completion_count(), 1);
}
