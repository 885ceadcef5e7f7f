//! HTTP endpoint layer
//!
//! Every `/api/*` route answers JSON, allows any origin, replies to a
//! bare `OPTIONS` with an empty 200 and to any other method with 405.

pub mod admin;
pub mod analytics;
pub mod contact;
pub mod playlist;
pub mod preferences;
pub mod send_wish;

use crate::app::AppState;
use crate::error::{AppError, Result};
use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, options, post, MethodRouter},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/analytics",
            endpoint(get(analytics::summary).post(analytics::record)),
        )
        .route("/api/contact-form", endpoint(post(contact::submit)))
        .route(
            "/api/music-playlist",
            endpoint(get(playlist::list).post(playlist::update)),
        )
        .route(
            "/api/preferences",
            endpoint(
                get(preferences::get)
                    .put(preferences::update)
                    .post(preferences::update)
                    .delete(preferences::reset),
            ),
        )
        .route("/api/send-wish", endpoint(post(send_wish::send)))
        .route("/api/admin/login", endpoint(post(admin::login)))
        .route("/media/{hash}", get(media))
        .layer(cors)
        .with_state(state)
}

/// Add the shared preflight and method-not-allowed handling
fn endpoint(methods: MethodRouter<AppState>) -> MethodRouter<AppState> {
    methods
        .merge(options(preflight))
        .fallback(method_not_allowed)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({
            "success": false,
            "error": "Method not allowed",
        })),
    )
        .into_response()
}

/// Serve an uploaded photo from the local blob store
async fn media(State(state): State<AppState>, Path(hash): Path<String>) -> Result<Response> {
    let blobs = state
        .blobs
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Media storage is not enabled".to_string()))?;

    let data = match blobs.read(&hash).await {
        Ok(data) => data,
        // Malformed keys are simply unknown media
        Err(AppError::BlobStore(_)) => {
            return Err(AppError::NotFound(format!("Media not found: {}", hash)));
        }
        Err(e) => return Err(e),
    };

    Ok(([(CONTENT_TYPE, sniff_image_type(&data))], data).into_response())
}

fn sniff_image_type(data: &[u8]) -> &'static str {
    match data {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `{"success": true, ...}` response body
pub(crate) fn success(extra: serde_json::Value) -> Json<serde_json::Value> {
    let mut body = serde_json::json!({ "success": true });
    if let (Some(body), serde_json::Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    Json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_image_type() {
        assert_eq!(sniff_image_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_image_type(b"\x89PNG\r\n"), "image/png");
        assert_eq!(sniff_image_type(b"RIFF\0\0\0\0WEBPVP8"), "image/webp");
        assert_eq!(sniff_image_type(b"hello"), "application/octet-stream");
    }

    #[test]
    fn test_success_body_merges_fields() {
        let Json(body) = success(serde_json::json!({ "message": "ok" }));
        assert_eq!(body, serde_json::json!({ "success": true, "message": "ok" }));
    }
}
