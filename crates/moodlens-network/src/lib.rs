//! # moodlens-network
//!
//! 원격 감정 검출 서비스 어댑터.
//! 프레임을 JPEG로 재인코딩하여 `/predict`와 같은 계약(multipart `file` 필드,
//! JSON 배열 응답)을 따르는 HTTP 엔드포인트로 전송한다.

pub mod remote_detector;
