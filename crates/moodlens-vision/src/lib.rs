//! # moodlens-vision
//!
//! 이미지 처리 어댑터.
//!
//! - [`decode`] — 업로드 바이트 → RGB 프레임 (포맷 자동 추정)
//! - [`encoder`] — 프레임 → JPEG (원격 검출기 전송용)
//! - [`annotate`] — 오버레이 계획을 정지 이미지에 렌더링
//! - [`postprocess`] — 얼굴 후보 NMS, 감정 로짓 → 점수
//! - `onnx_detector` — 로컬 ONNX 감정 검출기 (`onnx` feature)

pub mod annotate;
pub mod decode;
pub mod encoder;
pub mod font;
pub mod postprocess;

#[cfg(feature = "onnx")]
pub mod onnx_detector;
