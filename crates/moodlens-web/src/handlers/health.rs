//! 상태 확인 핸들러.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

/// 상태 확인 응답 DTO
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// 사용 중인 검출기 이름
    pub detector: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        detector: state.detector.detector_name().to_string(),
    })
}
