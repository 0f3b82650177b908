use std::time::Duration;

use serde_json::json;
use usaspending_api::{Client, Config, Error};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn quick_config(server: &MockServer) -> Config {
    Config::default()
        .with_base_url(&server.uri())
        .with_rate_limit(10_000, Duration::from_secs(1))
        .with_retry_delay(Duration::from_millis(10))
}

#[tokio::test]
async fn non_success_statuses_map_to_http_status_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/MISSING/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Award not found"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let err = client.get("/awards/MISSING/").await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "Award not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn long_error_bodies_are_truncated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/BAD/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("x".repeat(3000)))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let err = client.get("/awards/BAD/").await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 400);
            assert!(body.ends_with("...[truncated]"));
            assert!(body.len() < 3000);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn error_payloads_inside_ok_bodies_are_api_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/GONE/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "No award found"})),
        )
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let err = client.get("/awards/GONE/").await.unwrap_err();
    match err {
        Error::Api { message } => assert_eq!(message, "No award found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_an_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/WEIRD/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let err = client.get("/awards/WEIRD/").await.unwrap_err();
    match err {
        Error::Api { message } => assert!(message.starts_with("invalid JSON response")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn get_responses_are_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agency/080/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"toptier_code": "080"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let first = client.get("/agency/080/").await.unwrap();
    let second = client.get("/agency/080/").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn the_cache_can_be_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agency/080/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"toptier_code": "080"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = quick_config(&mock_server).with_cache_enabled(false);
    let client = Client::with_config(config).unwrap();
    client.get("/agency/080/").await.unwrap();
    client.get("/agency/080/").await.unwrap();
}

#[tokio::test]
async fn clearing_the_cache_forces_a_refetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agency/012/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"toptier_code": "012"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    client.get("/agency/012/").await.unwrap();
    client.clear_cache();
    client.get("/agency/012/").await.unwrap();
}

#[tokio::test]
async fn post_responses_are_never_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/transactions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    let payload = json!({"award_id": "X", "page": 1, "limit": 100});
    client.post("/transactions/", &payload).await.unwrap();
    client.post("/transactions/", &payload).await.unwrap();
}

#[tokio::test]
async fn server_errors_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/FLAKY/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/awards/FLAKY/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"generated_unique_award_id": "CONT_AWD_X"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_config(quick_config(&mock_server)).unwrap();
    let body = client.get("/awards/FLAKY/").await.unwrap();
    assert_eq!(body["generated_unique_award_id"], json!("CONT_AWD_X"));
}

#[tokio::test]
async fn retries_stop_after_the_configured_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/DOWN/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = quick_config(&mock_server).with_max_retries(1);
    let client = Client::with_config(config).unwrap();
    let err = client.get("/awards/DOWN/").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn deterministic_failures_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards/NOPE/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_config(quick_config(&mock_server)).unwrap();
    assert!(client.get("/awards/NOPE/").await.is_err());
}

#[tokio::test]
async fn requests_are_spaced_by_the_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/references/glossary/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&mock_server)
        .await;

    let config = Config::default()
        .with_base_url(&mock_server.uri())
        .with_rate_limit(10, Duration::from_millis(100))
        .with_cache_enabled(false);
    let client = Client::with_config(config).unwrap();

    let started = std::time::Instant::now();
    for _ in 0..3 {
        client.get("/references/glossary/").await.unwrap();
    }
    // Three requests at 10 per 100ms means at least two 10ms gaps.
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn the_user_agent_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/agency/097/"))
        .and(header(
            "user-agent",
            concat!("usaspending-api-rs/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"toptier_code": "097"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri());
    client.get("/agency/097/").await.unwrap();
}
