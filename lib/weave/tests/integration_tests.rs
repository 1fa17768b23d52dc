//! Integration tests for `HyperTransport` using wiremock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use weave::{Context, HyperTransport, Method, Request, Transport, TransportConfig};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct User {
    id: u64,
    name: String,
}

fn url(server: &MockServer, path: &str) -> url::Url {
    url::Url::parse(&format!("{}{path}", server.uri())).expect("url")
}

#[tokio::test]
async fn test_get_request() {
    let mock_server = MockServer::start().await;

    let user = User {
        id: 1,
        name: "Alice".to_string(),
    };

    Mock::given(method("GET"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&user))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Get, url(&mock_server, "/users/1"))
        .header("Accept", "application/json")
        .build();

    let response = transport.send(request).await.expect("response");

    assert!(response.is_success());
    let body: User = response.json().expect("json");
    assert_eq!(body, user);
}

#[tokio::test]
async fn test_post_request_with_json_body() {
    let mock_server = MockServer::start().await;

    let input = User {
        id: 0,
        name: "Bob".to_string(),
    };
    let output = User {
        id: 42,
        name: "Bob".to_string(),
    };

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(&input))
        .respond_with(ResponseTemplate::new(201).set_body_json(&output))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Post, url(&mock_server, "/users"))
        .json(&input)
        .expect("json body")
        .build();

    let response = transport.send(request).await.expect("response");

    assert_eq!(response.status(), 201);
    let body: User = response.json().expect("json");
    assert_eq!(body, output);
}

#[tokio::test]
async fn test_error_status_is_not_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/not-found"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Get, url(&mock_server, "/not-found")).build();

    let response = transport.send(request).await.expect("response");

    assert!(response.is_client_error());
    assert_eq!(response.text().expect("utf-8"), "Not Found");
}

#[tokio::test]
async fn test_query_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Get, url(&mock_server, "/search"))
        .query("q", "rust")
        .query("page", "1")
        .build();

    let response = transport.send(request).await.expect("response");

    assert!(response.is_success());
}

#[tokio::test]
async fn test_response_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/with-headers"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "abc123")
                .set_body_json(serde_json::json!({"ok": true})),
        )
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Get, url(&mock_server, "/with-headers")).build();

    let response = transport.send(request).await.expect("response");

    assert_eq!(response.header("x-request-id"), Some("abc123"));
    assert_eq!(response.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_configured_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::with_config(
        TransportConfig::builder()
            .timeout(Duration::from_millis(100))
            .build(),
    );
    let request = Request::builder(Method::Get, url(&mock_server, "/slow")).build();

    let err = transport.send(request).await.expect_err("expected timeout error");

    assert!(err.is_timeout(), "Expected timeout error, got: {err}");
}

#[tokio::test]
async fn test_context_deadline_wins_over_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let context = Context::background().with_timeout(Duration::from_millis(100));
    let request = Request::builder(Method::Get, url(&mock_server, "/slow"))
        .context(context)
        .build();

    let err = transport.send(request).await.expect_err("expected timeout error");

    assert!(err.is_timeout(), "Expected timeout error, got: {err}");
}

#[tokio::test]
async fn test_cancellation_during_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let context = Context::background();
    let request = Request::builder(Method::Get, url(&mock_server, "/slow"))
        .context(context.clone())
        .build();

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        context.cancel();
    });

    let err = transport.send(request).await.expect_err("expected cancellation");
    canceller.await.expect("canceller");

    assert!(err.is_cancelled(), "Expected cancellation, got: {err}");
}

#[tokio::test]
async fn test_connection_error() {
    let transport = HyperTransport::new();

    let url = url::Url::parse("http://127.0.0.1:1").expect("url");
    let request = Request::builder(Method::Get, url).build();

    let err = transport.send(request).await.expect_err("expected connection error");

    assert!(err.is_connection(), "Expected connection error, got: {err}");
}

#[tokio::test]
async fn test_delete_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/users/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::new();
    let request = Request::builder(Method::Delete, url(&mock_server, "/users/1")).build();

    let response = transport.send(request).await.expect("response");

    assert_eq!(response.status(), 204);
    assert!(response.body().is_empty());
}
