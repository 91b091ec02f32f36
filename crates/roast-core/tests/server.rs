//! HTTP routes, driven through the router without binding a port.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::*;
use roast_core::server::router;
use roast_core::SessionManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

const BOUNDARY: &str = "roast-test-boundary";

fn multipart_body(mode: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(mode) = mode {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\n{mode}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"me.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(mode: Option<&str>, image: Option<&[u8]>) -> Request<Body> {
    Request::post("/sessions")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(mode, image)))
        .unwrap()
}

fn message_request(id: &str, text: &str) -> Request<Body> {
    Request::post(format!("/sessions/{id}/messages"))
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": text }).to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn app(vision: &MockServer, chat: &MockServer) -> Router {
    router(Arc::new(SessionManager::new(service(vision, chat))))
}

#[tokio::test]
async fn test_health() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;

    let response = app(&vision, &chat)
        .await
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_full_conversation_over_http() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_reply(&vision, "short hair, glasses").await;
    mount_reply(&chat, "\"you look like a tired owl\"").await;
    let app = app(&vision, &chat).await;

    let upload = png_bytes(&rgba_image());
    let response = app
        .clone()
        .oneshot(upload_request(Some("roast"), Some(&upload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = json_body(response).await;
    assert_eq!(created["reply"], "you look like a tired owl");
    assert_eq!(created["mode"], "roast");
    assert_eq!(created["features"], "short hair, glasses");
    assert_eq!(created["transcript"][0]["content"], "*uploads photo*");
    assert_eq!(created["transcript"][0]["has_image"], true);
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(message_request(&id, "is that all?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["reply"], "you look like a tired owl");

    let response = app
        .clone()
        .oneshot(Request::get(format!("/sessions/{id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(json_body(response).await["transcript"].as_array().unwrap().len(), 4);

    let response = app
        .clone()
        .oneshot(Request::delete(format!("/sessions/{id}")).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(message_request(&id, "hello?"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_image_is_rejected() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;

    let response = app(&vision, &chat)
        .await
        .oneshot(upload_request(Some("nice"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(request_bodies(&vision).await.is_empty());
}

#[tokio::test]
async fn test_unknown_mode_is_rejected() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    let upload = png_bytes(&rgba_image());

    let response = app(&vision, &chat)
        .await
        .oneshot(upload_request(Some("spicy"), Some(&upload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .contains("spicy"));
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_status(&vision, 500).await;
    let upload = png_bytes(&rgba_image());

    let response = app(&vision, &chat)
        .await
        .oneshot(upload_request(None, Some(&upload)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("feature extraction failed"));
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    let id = uuid::Uuid::new_v4().to_string();

    let response = app(&vision, &chat)
        .await
        .oneshot(message_request(&id, "anyone?"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_message_is_rejected() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    let id = uuid::Uuid::new_v4().to_string();

    let response = app(&vision, &chat)
        .await
        .oneshot(message_request(&id, "   "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_undecodable_upload_is_bad_request() {
    let vision = MockServer::start().await;
    let chat = MockServer::start().await;
    mount_reply(&vision, "- never asked").await;

    let response = app(&vision, &chat)
        .await
        .oneshot(upload_request(Some("roast"), Some(&b"not an image"[..])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"]
        .as_str()
        .unwrap()
        .contains("could not decode image"));
    assert!(request_bodies(&vision).await.is_empty());
    assert!(request_bodies(&chat).await.is_empty());
}
