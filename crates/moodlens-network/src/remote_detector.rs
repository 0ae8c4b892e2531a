//! 원격 감정 검출기 클라이언트.
//!
//! 외부 검출 서비스(예: FER + MTCNN 사이드카)에 프레임을 보내고
//! `[{ "box": [...], "emotions": {...} }]` 응답을 그대로 도메인 모델로 받는다.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use moodlens_core::config::RemoteDetectorConfig;
use moodlens_core::error::CoreError;
use moodlens_core::models::detection::Detection;
use moodlens_core::models::frame::DecodedFrame;
use moodlens_core::ports::detector::EmotionDetector;
use moodlens_vision::encoder::{encode_jpeg, DEFAULT_JPEG_QUALITY};

/// 업로드 파일명 (브라우저 클라이언트와 동일)
const UPLOAD_FILE_NAME: &str = "frame.jpg";

/// 오류 응답 본문 로그/메시지 최대 길이 (문자)
const MAX_ERROR_BODY_CHARS: usize = 200;

// ============================================================
// RemoteEmotionDetector — 외부 검출 서비스 클라이언트
// ============================================================

/// 외부 검출 서비스 클라이언트
#[derive(Debug)]
pub struct RemoteEmotionDetector {
    /// HTTP 클라이언트 (요청 타임아웃 포함)
    http_client: reqwest::Client,
    /// 검출 엔드포인트 URL
    endpoint: String,
    /// 요청 타임아웃. 타임아웃 에러 메시지에 사용
    timeout: Duration,
}

impl RemoteEmotionDetector {
    /// 새 RemoteEmotionDetector 생성
    pub fn new(config: &RemoteDetectorConfig, timeout: Duration) -> Result<Self, CoreError> {
        if config.endpoint.trim().is_empty() {
            return Err(CoreError::Config("원격 검출기 엔드포인트 미설정".into()));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        debug!(
            endpoint = %config.endpoint,
            timeout_ms = timeout.as_millis() as u64,
            "RemoteEmotionDetector 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            timeout,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            CoreError::Network(format!("검출 서비스 호출 실패: {}", e))
        }
    }

    /// 응답 본문 → 검출 결과
    fn parse_response(body: &str) -> Result<Vec<Detection>, CoreError> {
        serde_json::from_str(body)
            .map_err(|e| CoreError::Detector(format!("검출 응답 파싱 실패: {}", e)))
    }
}

#[async_trait]
impl EmotionDetector for RemoteEmotionDetector {
    async fn detect_emotions(&self, frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        // 1. JPEG 재인코딩 (CPU 작업)
        let jpeg = tokio::task::spawn_blocking(move || encode_jpeg(&frame, DEFAULT_JPEG_QUALITY))
            .await
            .map_err(|e| CoreError::Encode(format!("인코딩 태스크 실패: {}", e)))??;

        debug!(
            endpoint = %self.endpoint,
            image_size = jpeg.len(),
            "검출 서비스 호출"
        );

        // 2. multipart 요청
        let part = Part::bytes(jpeg)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("image/jpeg")
            .map_err(|e| CoreError::Network(format!("multipart 구성 실패: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!(status = %status, "검출 서비스 오류 응답");
            return Err(CoreError::Detector(format!(
                "검출 서비스 오류 ({}): {}",
                status,
                body.chars().take(MAX_ERROR_BODY_CHARS).collect::<String>()
            )));
        }

        // 3. 응답 파싱
        let detections = Self::parse_response(&body)?;
        debug!(count = detections.len(), "검출 결과 수신");
        Ok(detections)
    }

    fn detector_name(&self) -> &str {
        "remote"
    }
}

// ============================================================
// 테스트
// ============================================================
