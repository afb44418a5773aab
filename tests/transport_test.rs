//! Wiremock integration tests for [`HttpTransport`].
//!
//! These verify the transport's contract with the engine: one attempt,
//! HTTP statuses pass through as `Ok`, connection failures come back as
//! `Err`.

use std::collections::BTreeMap;
use std::time::Duration;

use muninn::{HttpTransport, Method, MuninnError, Transport, WireRequest};
use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(uri: &str, method: Method) -> WireRequest {
    WireRequest {
        method,
        url: reqwest::Url::parse(&format!("{uri}/endpoint")).unwrap(),
        headers: BTreeMap::new(),
        body: None,
    }
}

#[tokio::test]
async fn delivers_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/endpoint"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-marker", "present")
                .set_body_raw(r#"{"ok":true}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new();
    let response = transport
        .send(request(&server.uri(), Method::Get))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, br#"{"ok":true}"#);
    assert_eq!(response.headers.get("x-marker").map(String::as_str), Some("present"));
    assert_eq!(response.url.path(), "/endpoint");
}

#[tokio::test]
async fn sends_headers_and_body_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/endpoint"))
        .and(header("x-token", "secret"))
        .and(body_bytes(br#"{"payload":1}"#.to_vec()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let mut wire = request(&server.uri(), Method::Post);
    wire.headers.insert("X-Token".into(), "secret".into());
    wire.body = Some(br#"{"payload":1}"#.to_vec());

    let response = HttpTransport::new().send(wire).await.unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn non_2xx_statuses_are_ok_not_err() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/endpoint"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = HttpTransport::new()
        .send(request(&server.uri(), Method::Delete))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
}

#[tokio::test]
async fn connection_failure_is_an_error() {
    // grab a port that stops listening before the dispatch
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let result = HttpTransport::with_timeout(Duration::from_secs(2))
        .send(request(&uri, Method::Get))
        .await;

    assert!(matches!(result, Err(MuninnError::Http(_))));
}
