//! API 에러 처리.
//!
//! 응답 본문은 항상 `{"error": <메시지>, "status": <코드>}`.
//! 검출기 내부 에러의 상세 내용은 로그로만 남기고 응답에는 노출하지 않는다.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use moodlens_core::error::CoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// `file` 필드 없음
pub const NO_FILE_PART: &str = "No file part";
/// 파일명이 빈 문자열
pub const NO_SELECTED_FILE: &str = "No selected file";
/// 디코딩 불가 이미지
pub const INVALID_IMAGE: &str = "Invalid image";
/// 업로드 한도 초과
pub const UPLOAD_TOO_LARGE: &str = "Upload too large";
/// 검출 실패 (상세 비공개)
pub const DETECTION_FAILED: &str = "Detection failed";
/// 검출기 연결 불가
pub const DETECTOR_UNAVAILABLE: &str = "Detector unavailable";
/// 검출 타임아웃
pub const DETECTION_TIMED_OUT: &str = "Detection timed out";

/// API 에러
#[derive(Debug, Error)]
pub enum ApiError {
    /// 잘못된 요청
    #[error("잘못된 요청: {0}")]
    BadRequest(String),

    /// 리소스를 찾을 수 없음
    #[error("리소스를 찾을 수 없음: {0}")]
    NotFound(String),

    /// 요청 본문 한도 초과
    #[error("요청 본문 한도 초과: {0}")]
    PayloadTooLarge(String),

    /// 내부 서버 오류
    #[error("내부 서버 오류: {0}")]
    Internal(String),

    /// 검출기 사용 불가
    #[error("서비스 사용 불가: {0}")]
    ServiceUnavailable(String),

    /// 검출기 응답 시간 초과
    #[error("응답 시간 초과: {0}")]
    GatewayTimeout(String),
}

/// 에러 응답 본문
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 에러 메시지
    pub error: String,
    /// HTTP 상태 코드
    pub status: u16,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::GatewayTimeout(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.message().to_string(),
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidImage(detail) => {
                warn!(%detail, "이미지 디코딩 실패");
                ApiError::BadRequest(INVALID_IMAGE.to_string())
            }
            CoreError::Timeout { timeout_ms } => {
                warn!(timeout_ms, "검출 타임아웃");
                ApiError::GatewayTimeout(DETECTION_TIMED_OUT.to_string())
            }
            CoreError::Network(detail) => {
                error!(%detail, "검출기 연결 실패");
                ApiError::ServiceUnavailable(DETECTOR_UNAVAILABLE.to_string())
            }
            other => {
                error!(error = %other, "검출 실패");
                ApiError::Internal(DETECTION_FAILED.to_string())
            }
        }
    }
}

/// 핸들러 패닉 → 500 "Detection failed".
///
/// 검출기 구현이 패닉하면 연결을 끊는 대신 일반 에러 본문을 돌려준다.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("알 수 없는 패닉");
    error!(%detail, "요청 처리 중 패닉");
    ApiError::Internal(DETECTION_FAILED.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ApiError::NotFound("/missing".to_string());
        assert!(err.to_string().contains("/missing"));
    }

    #[test]
    fn core_error_mapping() {
        let cases = [
            (
                CoreError::InvalidImage("bad png".into()),
                StatusCode::BAD_REQUEST,
                INVALID_IMAGE,
            ),
            (
                CoreError::Timeout { timeout_ms: 10 },
                StatusCode::GATEWAY_TIMEOUT,
                DETECTION_TIMED_OUT,
            ),
            (
                CoreError::Network("connection refused".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                DETECTOR_UNAVAILABLE,
            ),
            (
                CoreError::Detector("model exploded".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                DETECTION_FAILED,
            ),
            (
                CoreError::Encode("jpeg".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                DETECTION_FAILED,
            ),
        ];

        for (core, status, message) in cases {
            let api = ApiError::from(core);
            assert_eq!(api.status_code(), status);
            assert_eq!(api.message(), message);
        }
    }

    #[test]
    fn internal_details_are_not_exposed() {
        let api = ApiError::from(CoreError::Detector("secret stack trace".into()));
        assert!(!api.message().contains("secret"));
    }

    #[tokio::test]
    async fn panic_renders_generic_500() {
        let response = panic_response(Box::new("index out of bounds".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], DETECTION_FAILED);
        assert_eq!(json["status"], 500);
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorResponse {
            error: NO_FILE_PART.to_string(),
            status: 400,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "No file part");
        assert_eq!(json["status"], 400);
    }
}
