use mediascout_http::HttpClient;
use mediascout_types::config::{HttpProfile, ScrapingConfig};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn retries_on_503_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = HttpClient::new(Arc::new(ScrapingConfig::default())).unwrap();
    let url = format!("{}/flaky", server.uri());
    let response = client.get(&url, HttpProfile::Html).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn gives_up_after_exhausting_retries_on_persistent_500() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = HttpClient::new(Arc::new(ScrapingConfig::default())).unwrap();
    let url = format!("{}/down", server.uri());
    let err = client.get(&url, HttpProfile::Api).await.unwrap_err();
    assert_eq!(err.error_type_label(), "http_5xx");
}

#[tokio::test]
async fn does_not_retry_on_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(Arc::new(ScrapingConfig::default())).unwrap();
    let url = format!("{}/missing", server.uri());
    let err = client.get(&url, HttpProfile::Html).await.unwrap_err();
    assert_eq!(err.error_type_label(), "http_4xx");
}

#[tokio::test]
async fn honors_retry_after_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = HttpClient::new(Arc::new(ScrapingConfig::default())).unwrap();
    let url = format!("{}/limited", server.uri());
    let started = std::time::Instant::now();
    let response = client.get(&url, HttpProfile::Html).await.unwrap();
    assert_eq!(response.status, 200);
    assert!(started.elapsed() >= std::time::Duration::from_millis(900));
}

#[tokio::test]
async fn conditional_get_returns_304_on_matching_etag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(304))
        .mount(&server)
        .await;

    let client = HttpClient::new(Arc::new(ScrapingConfig::default())).unwrap();
    let url = format!("{}/feed.xml", server.uri());
    let response = client
        .get_conditional(&url, HttpProfile::Rss, Some("\"abc123\""))
        .await
        .unwrap();
    assert_eq!(response.status, 304);
}
