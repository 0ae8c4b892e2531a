//! 정적 파일 임베드 및 서빙.
//!
//! rust-embed로 캡처 클라이언트(`frontend/`)를 바이너리에 임베드.
//! 동적 데이터는 주입하지 않는다.

use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

use crate::error::ApiError;

/// 캡처 클라이언트 자산
#[derive(Embed)]
#[folder = "frontend"]
#[include = "*.html"]
#[include = "*.js"]
#[include = "*.css"]
#[include = "*.svg"]
#[include = "*.ico"]
struct Assets;

/// 정적 파일 서빙을 위한 fallback 핸들러
pub async fn serve_static(uri: Uri) -> Response {
    serve_static_impl(uri)
}

fn serve_static_impl(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    // 빈 경로는 index.html로
    let asset = if path.is_empty() { "index.html" } else { path };

    match Assets::get(asset) {
        Some(content) => {
            let mime = mime_guess::from_path(asset).first_or_octet_stream();

            let cache_control = if asset.ends_with(".html") {
                "no-cache"
            } else {
                "public, max-age=3600"
            };

            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime.as_ref()),
                    (header::CACHE_CONTROL, cache_control),
                ],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => ApiError::NotFound(format!("Not found: {}", uri.path())).into_response(),
    }
}
