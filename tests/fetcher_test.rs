//! Integration tests for the forum fetcher's retry and degradation behavior.

use std::time::{Duration, Instant};

use discourse_ingest::discourse::{empty_payload, Fetcher, QueryContext, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetcher with the production retry count but millisecond backoff.
fn fast_fetcher() -> Fetcher {
    Fetcher::new().unwrap().with_retry_policy(RetryPolicy {
        max_retries: 3,
        base_delay: Duration::from_millis(10),
    })
}

fn context(server: &MockServer) -> QueryContext {
    QueryContext::new(server.uri()).with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn test_success_returns_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"topic_list": {"topics": []}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let value = fast_fetcher()
        .fetch(&context(&mock_server), "/latest.json", &[])
        .await
        .expect("fetch failed");

    assert_eq!(value, json!({"topic_list": {"topics": []}}));
}

#[tokio::test]
async fn test_absent_query_params_are_omitted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .and(query_param("page", "3"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    fast_fetcher()
        .fetch(
            &context(&mock_server),
            "/latest.json",
            &[("category", None), ("page", Some("3".to_string()))],
        )
        .await
        .expect("fetch failed");
}

#[tokio::test]
async fn test_api_key_headers_default_username() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/t/1.json"))
        .and(header("Api-Key", "secret"))
        .and(header("Api-Username", "system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = context(&mock_server).with_credentials("secret", None);
    fast_fetcher()
        .fetch(&ctx, "/t/1.json", &[])
        .await
        .expect("fetch failed");
}

#[tokio::test]
async fn test_api_key_headers_explicit_username() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/t/1.json"))
        .and(header("Api-Key", "secret"))
        .and(header("Api-Username", "moderator"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = context(&mock_server).with_credentials("secret", Some("moderator".to_string()));
    fast_fetcher()
        .fetch(&ctx, "/t/1.json", &[])
        .await
        .expect("fetch failed");
}

#[tokio::test]
async fn test_rate_limit_exhausts_after_four_attempts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let value = fast_fetcher()
        .fetch(&context(&mock_server), "/latest.json", &[])
        .await
        .expect("exhausted rate limiting should not be an error");

    assert_eq!(value, empty_payload());
    // 10ms + 20ms + 40ms of backoff between the four attempts
    assert!(started.elapsed() >= Duration::from_millis(70));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let value = fast_fetcher()
        .fetch(&context(&mock_server), "/latest.json", &[])
        .await
        .expect("fetch failed");

    assert_eq!(value, json!({"ok": true}));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_server_error_degrades_without_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/t/9.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let value = fast_fetcher()
        .fetch(&context(&mock_server), "/t/9.json", &[])
        .await
        .expect("HTTP errors should degrade to the empty payload");

    assert_eq!(value, empty_payload());
}

#[tokio::test]
async fn test_not_found_degrades() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let value = fast_fetcher()
        .fetch(&context(&mock_server), "/t/404.json", &[])
        .await
        .unwrap();

    assert_eq!(value, empty_payload());
}

#[tokio::test]
async fn test_invalid_json_is_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let err = fast_fetcher()
        .fetch(&context(&mock_server), "/latest.json", &[])
        .await
        .unwrap_err();

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_timeout_is_network_error_without_retry() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let ctx = context(&mock_server).with_timeout(Duration::from_millis(100));
    let err = fast_fetcher()
        .fetch(&ctx, "/latest.json", &[])
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Nothing listens on port 1
    let uri = "http://127.0.0.1:1";

    let ctx = QueryContext::new(uri).with_timeout(Duration::from_secs(2));
    let err = fast_fetcher()
        .fetch(&ctx, "/latest.json", &[])
        .await
        .unwrap_err();

    assert!(err.is_network());
}

#[tokio::test]
async fn test_missing_base_url_is_config_error() {
    let ctx = QueryContext::new("");
    let err = fast_fetcher()
        .fetch(&ctx, "/latest.json", &[])
        .await
        .unwrap_err();

    assert!(matches!(err, discourse_ingest::IngestError::Config(_)));
}
