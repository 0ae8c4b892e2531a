//! 라우트 정의.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::AppState;

/// 엔드포인트 라우트 생성 (정적 자산은 fallback에서 처리)
pub fn app_routes() -> Router<AppState> {
    Router::new()
        // 감정 검출
        .route("/predict", post(handlers::predict::predict))
        // 상태 확인
        .route("/health", get(handlers::health::health))
}
