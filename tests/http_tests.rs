use std::collections::BTreeMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tryon_studio::http::{
    client::{HttpTransport, Transport},
    error::TransportError,
    progress::ProgressHandle,
    request::{FormPayload, Request},
};

use crate::common::file;

mod common;

// =========================================================================
// Helpers
// =========================================================================

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(base_url, Duration::from_secs(5)).unwrap()
}

/// The blocking client owns its own runtime, so it is built and used only
/// on a blocking thread.
async fn send(
    server: &MockServer,
    request: Request,
    progress: Option<ProgressHandle>,
) -> Result<serde_json::Value, TransportError> {
    let uri = server.uri();
    tokio::task::spawn_blocking(move || transport(&uri).send(&request, progress.as_ref()))
        .await
        .unwrap()
}

/// A local port with nothing listening on it.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

// =========================================================================
// Requests
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn json_post_sets_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/prompt/expand"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"prompt": "cat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prompt": "cat, cute"})))
        .expect(1)
        .mount(&server)
        .await;

    let value = send(
        &server,
        Request::json("/prompt/expand", &json!({"prompt": "cat"})).unwrap(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(value["prompt"], "cat, cute");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/options"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ckpt_choices": ["a"]})))
        .mount(&server)
        .await;

    let value = send(&server, Request::get("/models/options"), None).await.unwrap();
    assert_eq!(value["ckpt_choices"][0], "a");
}

#[tokio::test(flavor = "multi_thread")]
async fn multipart_carries_fields_and_files_with_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/inpaint"))
        .and(body_string_contains("name=\"prompt\""))
        .and(body_string_contains("red dress"))
        .and(body_string_contains("filename=\"mask.png\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"message": "ok", "download": "/outputs/in.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = FormPayload {
        fields: vec![("prompt".into(), "red dress".into())],
        files: vec![
            ("image".into(), file("base.png", &[7u8; 4096])),
            ("mask".into(), file("mask.png", &[1u8; 1024])),
        ],
    };
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let handle = ProgressHandle::new().with_listener(move |p| sink.lock().unwrap().push(p));

    let value = send(
        &server,
        Request::multipart("/inpaint", payload),
        Some(handle.clone()),
    )
    .await
    .unwrap();

    assert_eq!(value["download"], "/outputs/in.png");
    assert_eq!(handle.percent(), 100);
    assert_eq!(seen.lock().unwrap().last(), Some(&100));
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test(flavor = "multi_thread")]
async fn non_2xx_keeps_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text2image"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"bad size"}"#))
        .mount(&server)
        .await;

    let err = send(
        &server,
        Request::multipart("/text2image", FormPayload::default()),
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        TransportError::Server {
            status: 400,
            body: r#"{"error":"bad size"}"#.into()
        }
    );
    assert!(err.is_server());
}

#[tokio::test(flavor = "multi_thread")]
async fn success_with_html_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/prompt/presets"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = send(&server, Request::get("/prompt/presets"), None)
        .await
        .unwrap_err();

    match err {
        TransportError::Malformed { body, .. } => assert_eq!(body, "<html>login</html>"),
        other => panic!("Expected malformed, got {:?}", other),
    }
}

#[test]
fn unreachable_server_is_network_error() {
    let http = HttpTransport::new(&closed_port_url(), Duration::from_secs(2)).unwrap();

    let err = http.send(&Request::get("/models/options"), None).unwrap_err();

    assert!(err.is_network(), "expected network error, got {:?}", err);
    assert!(!err.is_server());
}

#[test]
fn unserializable_json_body_is_rejected_before_sending() {
    let mut keyed = BTreeMap::new();
    keyed.insert((1u8, 2u8), "tuple keys are not JSON object keys");

    let err = Request::json("/prompt/expand", &keyed).unwrap_err();

    assert!(matches!(err, TransportError::InvalidBody(_)));
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = HttpTransport::new("not a url", Duration::from_secs(1)).err().unwrap();
    assert!(matches!(err, TransportError::InvalidEndpoint { .. }));
}

// =========================================================================
// Downloads
// =========================================================================

#[test]
fn resolve_joins_root_relative_paths() {
    let http = HttpTransport::new("http://127.0.0.1:5000", Duration::from_secs(1)).unwrap();

    assert_eq!(
        http.resolve("/outputs/a.png").unwrap().as_str(),
        "http://127.0.0.1:5000/outputs/a.png"
    );
    assert_eq!(
        http.resolve("https://cdn.example.com/v.mp4").unwrap().as_str(),
        "https://cdn.example.com/v.mp4"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn download_fetches_result_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outputs/a.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outputs/missing.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (found, missing) = tokio::task::spawn_blocking(move || {
        let http = transport(&uri);
        (http.download("/outputs/a.png"), http.download("/outputs/missing.png"))
    })
    .await
    .unwrap();

    assert_eq!(found.unwrap(), vec![1, 2, 3]);
    assert!(matches!(
        missing,
        Err(TransportError::Server { status: 404, .. })
    ));
}
