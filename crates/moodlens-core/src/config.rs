//! 애플리케이션 설정 구조체.
//!
//! 웹 서버 바인딩, 업로드 한도, 검출기 백엔드 설정을 정의한다.
//! `config` crate를 통해 파일/환경변수에서 로드 (`moodlens-app` 참조).
//! 모든 섹션과 필드에 기본값이 있어 빈 설정 파일도 유효하다.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::CoreError;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 검출기 설정
    #[serde(default)]
    pub detector: DetectorConfig,
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 웹 서버 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 포트 (기본: 5000)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 업로드 요청 본문 최대 크기 (바이트)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl WebConfig {
    /// 바인드 호스트
    pub fn host(&self) -> &'static str {
        if self.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}

// ============================================================
// 검출기 설정
// ============================================================

/// 검출기 백엔드 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorBackend {
    /// 외부 검출 서비스 (`/predict` 계약을 따르는 HTTP 엔드포인트)
    #[default]
    Remote,
    /// 로컬 ONNX 모델 (`onnx` feature 필요)
    Onnx,
}

/// 검출기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// 사용할 백엔드
    #[serde(default)]
    pub backend: DetectorBackend,
    /// 검출 1회 타임아웃 (밀리초)
    #[serde(default = "default_detect_timeout_ms")]
    pub timeout_ms: u64,
    /// 원격 검출기 설정
    #[serde(default)]
    pub remote: RemoteDetectorConfig,
    /// ONNX 검출기 설정
    #[serde(default)]
    pub onnx: OnnxDetectorConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            backend: DetectorBackend::default(),
            timeout_ms: default_detect_timeout_ms(),
            remote: RemoteDetectorConfig::default(),
            onnx: OnnxDetectorConfig::default(),
        }
    }
}

impl DetectorConfig {
    /// 검출 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 원격 검출기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDetectorConfig {
    /// 검출 엔드포인트 URL (multipart `file` 필드를 받는 POST)
    #[serde(default = "default_remote_endpoint")]
    pub endpoint: String,
}

impl Default for RemoteDetectorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_remote_endpoint(),
        }
    }
}

/// ONNX 검출기 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnnxDetectorConfig {
    /// 얼굴 검출 모델 경로 (UltraFace RFB-320)
    #[serde(default = "default_face_model")]
    pub face_model: PathBuf,
    /// 감정 분류 모델 경로 (FER+ 8-class)
    #[serde(default = "default_emotion_model")]
    pub emotion_model: PathBuf,
    /// 얼굴 검출 신뢰도 임계값 (0.0 ~ 1.0)
    #[serde(default = "default_face_confidence")]
    pub face_confidence: f32,
}

impl Default for OnnxDetectorConfig {
    fn default() -> Self {
        Self {
            face_model: default_face_model(),
            emotion_model: default_emotion_model(),
            face_confidence: default_face_confidence(),
        }
    }
}

// ============================================================
// AppConfig impl
// ============================================================

impl AppConfig {
    /// 기본 설정값 반환
    pub fn default_config() -> Self {
        Self::default()
    }

    /// 설정값 유효성 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.web.port == 0 {
            return Err(CoreError::Config("web.port는 0일 수 없음".to_string()));
        }
        if self.web.max_upload_bytes == 0 {
            return Err(CoreError::Config(
                "web.max_upload_bytes는 0보다 커야 함".to_string(),
            ));
        }
        if self.detector.timeout_ms == 0 {
            return Err(CoreError::Config(
                "detector.timeout_ms는 0보다 커야 함".to_string(),
            ));
        }
        if self.detector.backend == DetectorBackend::Remote
            && self.detector.remote.endpoint.trim().is_empty()
        {
            return Err(CoreError::Config(
                "detector.remote.endpoint 미설정".to_string(),
            ));
        }
        let confidence = self.detector.onnx.face_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::Config(format!(
                "detector.onnx.face_confidence 범위 초과: {}",
                confidence
            )));
        }
        Ok(())
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_web_port() -> u16 {
    5000
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024 // 10 MiB
}
fn default_detect_timeout_ms() -> u64 {
    10_000
}
fn default_remote_endpoint() -> String {
    "http://127.0.0.1:5001/predict".to_string()
}
fn default_face_model() -> PathBuf {
    PathBuf::from("models/version-RFB-320.onnx")
}
fn default_emotion_model() -> PathBuf {
    PathBuf::from("models/emotion-ferplus-8.onnx")
}
fn default_face_confidence() -> f32 {
    0.7
}
