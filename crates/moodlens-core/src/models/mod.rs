//! moodlens 도메인 모델.
//!
//! 검출 결과는 `serde` Serialize/Deserialize를 구현하며
//! `/predict` 응답 스키마와 1:1로 대응한다.

pub mod detection;
pub mod emotion;
pub mod frame;
