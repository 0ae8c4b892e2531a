//! 감정 레이블과 표시 색상.
//!
//! 레이블 집합은 닫혀 있다 (7종). 브라우저 클라이언트(`frontend/app.js`)의
//! `COLOR_MAP`과 같은 색상표를 유지해야 한다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 감정 레이블 (닫힌 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    /// 모든 레이블 (검출기 출력 순서)
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    /// 와이어 포맷 레이블 (소문자)
    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }

    /// 레이블 문자열 → 감정. 집합 밖 레이블이면 `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == label)
    }

    /// 오버레이 테두리 색상
    pub fn color(self) -> Rgb {
        match self {
            Emotion::Angry => Rgb::new(0xff, 0x33, 0x33),
            Emotion::Disgust => Rgb::new(0x99, 0x00, 0x99),
            Emotion::Fear => Rgb::new(0x66, 0x00, 0xcc),
            Emotion::Happy => Rgb::new(0x00, 0xe6, 0x76),
            Emotion::Sad => Rgb::new(0x29, 0x79, 0xff),
            Emotion::Surprise => Rgb::new(0xff, 0xd6, 0x00),
            Emotion::Neutral => Rgb::new(0xbd, 0xbd, 0xbd),
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 색상표에 없는 레이블에 쓰는 색상 (#00e5ff)
pub const FALLBACK_COLOR: Rgb = Rgb::new(0x00, 0xe5, 0xff);

/// 레이블 텍스트 색상 (페이지 배경색 #181c20)
pub const LABEL_TEXT_COLOR: Rgb = Rgb::new(0x18, 0x1c, 0x20);

/// 레이블 문자열에 대한 색상 조회. 알 수 없는 레이블은 [`FALLBACK_COLOR`].
pub fn color_for_label(label: &str) -> Rgb {
    Emotion::from_label(label)
        .map(Emotion::color)
        .unwrap_or(FALLBACK_COLOR)
}

/// 24비트 RGB 색상
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS 헥스 표기 (`#rrggbb`)
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
