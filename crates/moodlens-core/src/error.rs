//! moodlens 핵심 에러 타입.
//!
//! 어댑터 crate(vision, network, web)는 이 타입을 그대로 반환하거나
//! 자체 에러 타입에서 `From<CoreError>`로 변환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 디코딩, 검출기 호출, 설정 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 업로드 바이트를 이미지로 디코딩할 수 없음
    #[error("이미지 디코딩 실패: {0}")]
    InvalidImage(String),

    /// 이미지 인코딩 실패 (원격 검출기 전송, 주석 이미지 저장)
    #[error("이미지 인코딩 실패: {0}")]
    Encode(String),

    /// 검출기 내부 실패 (모델 실행 오류, 잘못된 응답 등)
    #[error("검출기 에러: {0}")]
    Detector(String),

    /// 네트워크 에러 (원격 검출기 연결 실패)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 검출 타임아웃
    #[error("검출 타임아웃: {timeout_ms}ms 초과")]
    Timeout {
        /// 초과된 타임아웃 시간 (밀리초)
        timeout_ms: u64,
    },

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}
