//! # moodlens-core
//!
//! moodlens 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 모든 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 검출 결과/감정/프레임 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스 (async_trait)
//! - [`overlay`] — 검출 결과 → 오버레이 그리기 계획
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체
//! - [`config_loader`] — 설정 로드 (기본값 → 파일 → 환경변수)

pub mod config;
pub mod config_loader;
pub mod error;
pub mod models;
pub mod overlay;
pub mod ports;
