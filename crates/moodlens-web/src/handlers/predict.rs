//! 감정 검출 핸들러.
//!
//! 검증 순서:
//! 1. `file` 파트 없음 (multipart가 아니거나 파일명 파라미터가 없는 일반 폼 값 포함) → "No file part"
//! 2. 파일명이 빈 문자열 → "No selected file"
//! 3. 이미지로 디코딩 불가 (0바이트 포함) → "Invalid image"

use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use moodlens_core::models::detection::Detection;
use moodlens_vision::decode::decode_image;
use tracing::{debug, warn};

use crate::error::{
    ApiError, DETECTION_FAILED, DETECTION_TIMED_OUT, NO_FILE_PART, NO_SELECTED_FILE,
    UPLOAD_TOO_LARGE,
};
use crate::AppState;

/// 업로드 파일 필드 이름
const FILE_FIELD: &str = "file";

/// 업로드 이미지에서 얼굴별 감정 점수 검출
///
/// POST /predict (multipart/form-data, 필드 `file`)
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<Detection>>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(%rejection, "multipart 요청 아님");
        ApiError::BadRequest(NO_FILE_PART.to_string())
    })?;

    let bytes = read_file_field(&mut multipart).await?;

    // 디코딩은 CPU 작업이라 blocking 풀에서 실행
    let frame = tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| {
            warn!(error = %e, "디코딩 태스크 실패");
            ApiError::Internal(DETECTION_FAILED.to_string())
        })??;

    let detections = tokio::time::timeout(
        state.detect_timeout,
        state.detector.detect_emotions(frame),
    )
    .await
    .map_err(|_| {
        warn!(
            timeout_ms = state.detect_timeout.as_millis() as u64,
            detector = state.detector.detector_name(),
            "검출 타임아웃"
        );
        ApiError::GatewayTimeout(DETECTION_TIMED_OUT.to_string())
    })??;

    debug!(faces = detections.len(), "검출 완료");
    Ok(Json(detections))
}

/// 첫 번째 `file` 파일 파트의 바이트를 읽는다
async fn read_file_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // 파일명 파라미터가 없는 파트는 파일 업로드가 아니다
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if file_name.is_empty() {
            return Err(ApiError::BadRequest(NO_SELECTED_FILE.to_string()));
        }

        debug!(file_name = %file_name, size = bytes.len(), "업로드 수신");
        return Ok(bytes);
    }

    Err(ApiError::BadRequest(NO_FILE_PART.to_string()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %err.body_text(), "업로드 한도 초과");
        ApiError::PayloadTooLarge(UPLOAD_TOO_LARGE.to_string())
    } else {
        debug!(error = %err.body_text(), "multipart 파싱 실패");
        ApiError::BadRequest(NO_FILE_PART.to_string())
    }
}
