//! Front door tests: static docs, panic recovery, default content type.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use gatehouse::front_door;
use gatehouse::gateway::{ServeMux, services};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn docs_router(root: &std::path::Path) -> Router {
    common::write_docs(root);
    let config = common::test_config(root);
    let channel = common::bridge_channel().await;
    let mut mux = ServeMux::new();
    services::register_all(&mut mux, &channel).unwrap();
    front_door::router(mux, &config.docs)
}

async fn fetch(router: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();
    (status, content_type, body)
}

#[tokio::test]
async fn serves_api_description_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let router = docs_router(dir.path()).await;

    let (status, content_type, body) = fetch(router, "/docs/swagger.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, common::SWAGGER_JSON.as_bytes());
}

#[tokio::test]
async fn serves_docs_directory_with_prefix_stripped() {
    let dir = tempfile::tempdir().unwrap();
    let router = docs_router(dir.path()).await;

    let (status, content_type, body) = fetch(router, "/docs/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert_eq!(body, common::INDEX_HTML.as_bytes());
}

#[tokio::test]
async fn missing_doc_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let router = docs_router(dir.path()).await;

    let (status, _, _) = fetch(router, "/docs/nope.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn gateway_is_mounted_at_root() {
    let dir = tempfile::tempdir().unwrap();
    let router = docs_router(dir.path()).await;

    let (status, content_type, body) = fetch(router, "/v1/greet/Gatehouse").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "message": "Gatehouse world" }));
}

#[tokio::test]
async fn responses_default_to_json_content_type() {
    let router = front_door::with_middleware(Router::new().route("/plain", get(|| async { "ok" })));
    // Handlers that set their own content type keep it.
    let (_, content_type, _) = fetch(router, "/plain").await;
    assert!(content_type.unwrap().starts_with("text/plain"));

    let router = front_door::with_middleware(
        Router::new().route("/bare", get(|| async { StatusCode::NO_CONTENT })),
    );
    let (status, content_type, _) = fetch(router, "/bare").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(content_type.as_deref(), Some("application/json"));
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

#[tokio::test]
async fn panics_become_internal_errors() {
    let router = front_door::with_middleware(Router::new().route("/boom", get(boom)));

    let (status, content_type, body) = fetch(router, "/boom").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        body,
        json!({ "code": 13, "message": "internal server error", "details": [] })
    );
}
