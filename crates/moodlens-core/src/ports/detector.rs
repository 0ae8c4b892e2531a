//! 얼굴/감정 검출기 포트.
//!
//! 구현: `moodlens-network` (원격 검출 서비스), `moodlens-vision` (ONNX, `onnx` feature)

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::detection::Detection;
use crate::models::frame::DecodedFrame;

/// 얼굴 검출 + 감정 분류기.
///
/// 프로세스 전체에서 하나의 인스턴스를 `Arc<dyn EmotionDetector>`로 공유한다.
/// 동시 요청에서 호출되므로 구현체는 읽기 전용이거나 내부에서 직접 잠가야 한다.
#[async_trait]
pub trait EmotionDetector: Send + Sync {
    /// 프레임에서 얼굴을 찾아 감정 점수와 함께 반환.
    ///
    /// 얼굴이 없으면 빈 벡터 (에러 아님). 순서는 구현체가 정한다.
    async fn detect_emotions(&self, frame: DecodedFrame) -> Result<Vec<Detection>, CoreError>;

    /// 검출기 이름 (예: "remote", "onnx-ultraface-ferplus")
    fn detector_name(&self) -> &str;
}
