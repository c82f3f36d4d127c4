//! Integration tests for the upload and delete endpoints.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{encoded_image, file_names, temp_store};
use image::{GenericImageView, ImageFormat};
use photoshare_assets::http::{AppState, router};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "photoshare-test-boundary";
const MAX_UPLOAD_BYTES: usize = 1024 * 1024;

fn multipart_body(field: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"upload\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn upload_request(field: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/photos")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, content_type, data)))
        .unwrap()
}

fn delete_request(filename: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(format!("/api/photos/{filename}"))
        .body(Body::empty())
        .unwrap()
}

fn test_app() -> (tempfile::TempDir, Arc<photoshare_assets::AssetStore>, axum::Router) {
    let (dir, store) = temp_store();
    let store = Arc::new(store);
    let state = AppState {
        store: store.clone(),
        public_url: "http://photos.test".to_string(),
    };
    (dir, store, router(state, MAX_UPLOAD_BYTES))
}

#[tokio::test]
async fn upload_then_fetch_then_delete() {
    let (_dir, store, app) = test_app();
    let bytes = encoded_image(40, 25, ImageFormat::Png);

    let (status, json) = send(&app, upload_request("photo", "image/png", &bytes)).await;
    assert_eq!(status, StatusCode::CREATED, "{json}");
    let filename = json["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".png"));
    assert_eq!(json["content_type"], "image/png");
    assert_eq!(
        json["thumbnail_url"],
        format!("http://photos.test/thumbnails/{filename}")
    );
    assert_eq!(
        json["original_url"],
        format!("http://photos.test/uploads/{filename}")
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/thumbnails/{filename}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let thumbnail = image::load_from_memory_with_format(&served, ImageFormat::Png).unwrap();
    assert_eq!(thumbnail.dimensions(), (300, 300));

    let (status, _) = send(&app, delete_request(&filename)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(file_names(store.uploads_dir()).is_empty());
    assert!(file_names(store.thumbnails_dir()).is_empty());

    let (status, _) = send(&app, delete_request(&filename)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unsupported_type_is_rejected_without_files() {
    let (_dir, store, app) = test_app();
    let bytes = encoded_image(10, 10, ImageFormat::Png);

    let (status, json) = send(&app, upload_request("photo", "image/bmp", &bytes)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Not a valid image");
    assert!(!store.uploads_dir().exists());
    assert!(!store.thumbnails_dir().exists());
}

#[tokio::test]
async fn missing_photo_field_is_bad_request() {
    let (_dir, _store, app) = test_app();
    let bytes = encoded_image(10, 10, ImageFormat::Png);

    let (status, json) = send(&app, upload_request("avatar", "image/png", &bytes)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No image was posted");
}

#[tokio::test]
async fn corrupt_image_is_bad_request() {
    let (_dir, store, app) = test_app();

    let (status, _) = send(&app, upload_request("photo", "image/jpeg", b"not a jpeg")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(file_names(store.uploads_dir()).is_empty());
    assert!(file_names(store.thumbnails_dir()).is_empty());
}

#[tokio::test]
async fn hidden_filename_cannot_be_deleted() {
    let (_dir, _store, app) = test_app();
    let (status, _) = send(&app, delete_request(".staging-abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
