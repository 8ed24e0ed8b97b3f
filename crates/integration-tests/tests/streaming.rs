mod harness;

use harness::PIXEL;
use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use harness::server::{TestClient, result_text};
use serde_json::json;

#[tokio::test]
async fn streamed_chunks_are_accumulated() {
    let mock = MockLlm::start_with_response("Two identical pixels side by side").await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).with_streaming(true).build();
    assert!(config.server.stream);

    let client = TestClient::start(&config).await.unwrap();
    let result = client
        .call("compare_images", json!({ "image_urls": [PIXEL, PIXEL] }))
        .await
        .unwrap();

    assert_ne!(result.is_error, Some(true));
    assert_eq!(result_text(&result), "Two identical pixels side by side");
    assert_eq!(mock.requests()[0]["stream"], true);
}

#[tokio::test]
async fn stdio_never_streams() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();
    assert!(!config.server.stream);

    let client = TestClient::start(&config).await.unwrap();
    client
        .call("summarize_image", json!({ "image_url": PIXEL }))
        .await
        .unwrap();

    assert_eq!(mock.requests()[0]["stream"], false);
}
