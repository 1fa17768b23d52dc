//! Integration tests for the ready-made interceptors and closure interceptors.

use std::collections::HashMap;

use bytes::Bytes;
use serde::Deserialize;
use weave::{
    Client, Context, Destination, DumpInterceptor, LogLevel, Method, NanToNullInterceptor, Next,
    Request, from_fn,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

#[derive(Debug, Deserialize)]
struct Reading {
    sensor: String,
    value: Option<f64>,
}

fn base_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

/// Test that the NaN interceptor makes non-standard JSON decodable.
#[tokio::test]
async fn test_nan_to_null_repairs_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/readings/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sensor":"t1","value":NaN}"#))
        .mount(&mock_server)
        .await;

    let plain = Client::builder()
        .base_url(base_url(&mock_server))
        .build()
        .expect("client");
    let broken: weave::Result<Option<Reading>> = plain.get("readings/1").await;
    assert!(broken.is_err_and(|err| err.is_decode()));

    let repaired = Client::builder()
        .base_url(base_url(&mock_server))
        .interceptor(NanToNullInterceptor)
        .build()
        .expect("client");
    let reading: Reading = repaired
        .get("readings/1")
        .await
        .expect("response")
        .expect("body");

    assert_eq!(reading.sensor, "t1");
    assert_eq!(reading.value, None);
}

/// Test that the dump interceptor doesn't break request/response flow.
#[tokio::test]
async fn test_dump_interceptor_is_transparent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/logged"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"logged": true})))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(base_url(&mock_server))
        .interceptor(DumpInterceptor::with_level(LogLevel::Info))
        .build()
        .expect("client");

    let body: Option<serde_json::Value> = client
        .post("logged", &serde_json::json!({"hello": "world"}))
        .await
        .expect("response");

    assert_eq!(body, Some(serde_json::json!({"logged": true})));
}

/// Test that a closure interceptor can add an Authorization header.
#[tokio::test]
async fn test_closure_interceptor_adds_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/protected"))
        .and(header("Authorization", "Bearer my-secret-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(base_url(&mock_server))
        .interceptor(from_fn(|mut request: Request, next: Next| async move {
            request.set_header("Authorization", "Bearer my-secret-token");
            next.run(request).await
        }))
        .build()
        .expect("client");

    let request = client
        .build_request::<()>(Method::Get, "protected", None)
        .expect("request");
    let response = client
        .execute(Context::background(), request, Destination::Discard)
        .await
        .expect("response");

    assert!(response.is_success());
}

/// Test that dump and repair compose, outermost first.
#[tokio::test]
async fn test_interceptor_composition() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/composed"))
        .and(header("X-Client", "weave"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"sensor":"c","value":NaN}"#))
        .mount(&mock_server)
        .await;

    let client = Client::builder()
        .base_url(base_url(&mock_server))
        .interceptor(DumpInterceptor::new())
        .interceptor(from_fn(|mut request: Request, next: Next| async move {
            request.set_header("X-Client", "weave");
            next.run(request).await
        }))
        .interceptor(NanToNullInterceptor)
        .build()
        .expect("client");

    let reading: Option<Reading> = client.get("composed").await.expect("response");

    assert!(reading.is_some_and(|reading| reading.value.is_none()));
}

/// Test that a short-circuiting interceptor never reaches the network.
#[tokio::test]
async fn test_short_circuit_interceptor() {
    let client = Client::builder()
        .base_url("http://127.0.0.1:1/")
        .interceptor(from_fn(|request: Request, _next: Next| async move {
            let body = format!(r#"{{"sensor":"{}","value":1.5}}"#, request.url().path());
            Ok::<_, weave::Error>(weave::Response::new(200, HashMap::new(), Bytes::from(body)))
        }))
        .build()
        .expect("client");

    let reading: Reading = client
        .get("cached")
        .await
        .expect("response")
        .expect("body");

    assert_eq!(reading.sensor, "/cached");
    assert_eq!(reading.value, Some(1.5));
}
