use std::io::Cursor;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use chrono::Utc;
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::content_type::is_allowed;
use crate::error::{AssetError, AssetResult, ErrorKind};
use crate::store::{AssetStorage, AssetStore};

const PHOTO_FIELD: &str = "photo";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AssetStore>,
    pub public_url: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct UploadResponse {
    filename: String,
    content_type: String,
    original_url: String,
    thumbnail_url: String,
    uploaded_at: String,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.store.uploads_dir());
    let thumbnails = ServeDir::new(state.store.thumbnails_dir());
    Router::new()
        .route(
            "/api/photos",
            post(upload_photo).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/api/photos/{filename}", delete(delete_photo))
        .nest_service("/uploads", uploads)
        .nest_service("/thumbnails", thumbnails)
        .with_state(state)
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse { error: message.to_string() })).into_response()
}

fn asset_error_response(err: &AssetError) -> Response {
    let status = match err.kind() {
        ErrorKind::Filesystem if err.is_not_found() => StatusCode::NOT_FOUND,
        _ if err.is_bad_input() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "asset operation failed");
    } else {
        tracing::debug!(error = %err, %status, "asset request rejected");
    }
    json_error(status, &err.to_string())
}

fn public_link(base: &str, root: &str, filename: &str) -> String {
    format!("{}/{root}/{filename}", base.trim_end_matches('/'))
}

pub async fn upload_photo(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut content_type = None;
    let mut bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some(PHOTO_FIELD) {
                    content_type = field.content_type().map(|value| value.to_string());
                    match field.bytes().await {
                        Ok(data) => bytes = Some(data),
                        Err(err) => {
                            return json_error(
                                StatusCode::BAD_REQUEST,
                                &format!("failed to read upload: {err}"),
                            );
                        }
                    }
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                return json_error(
                    StatusCode::BAD_REQUEST,
                    &format!("failed to read form: {err}"),
                );
            }
        }
    }

    let Some(bytes) = bytes else {
        return json_error(StatusCode::BAD_REQUEST, "No image was posted");
    };
    if bytes.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Uploaded file is empty");
    }
    let content_type = match content_type {
        Some(value) if is_allowed(&value) => value,
        _ => return json_error(StatusCode::BAD_REQUEST, "Not a valid image"),
    };

    let store = state.store.clone();
    let label = content_type.clone();
    let result = tokio::task::spawn_blocking(move || -> AssetResult<String> {
        let filename = store.allocate_filename(&label)?;
        store.store(&mut Cursor::new(bytes), &filename, &label)?;
        Ok(filename)
    })
    .await;

    let filename = match result {
        Ok(Ok(filename)) => filename,
        Ok(Err(err)) => return asset_error_response(&err),
        Err(err) => {
            tracing::error!(error = %err, "upload task failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "upload task failed");
        }
    };

    let response = UploadResponse {
        original_url: public_link(&state.public_url, "uploads", &filename),
        thumbnail_url: public_link(&state.public_url, "thumbnails", &filename),
        filename,
        content_type,
        uploaded_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    let store = state.store.clone();
    let result = tokio::task::spawn_blocking(move || store.clean(&filename)).await;
    match result {
        Ok(Ok(())) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(err)) => asset_error_response(&err),
        Err(err) => {
            tracing::error!(error = %err, "delete task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "delete task failed")
        }
    }
}
