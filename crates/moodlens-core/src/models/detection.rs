//! 얼굴 검출 결과 모델.
//!
//! 와이어 포맷: `{"box": [x, y, w, h], "emotions": {"happy": 0.9, ...}}`.
//! `box`는 객체가 아니라 4원소 배열이다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::emotion::Emotion;

/// 얼굴 바운딩 박스 (원본 프레임 픽셀 좌표)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// 얼굴 하나의 감정 점수.
///
/// 점수는 독립적인 분류기 출력이며 합이 1일 필요가 없다. 재정규화하지 않는다.
/// 키는 문자열로 보관하여 원격 검출기가 닫힌 집합 밖의 레이블을 보내도
/// 그대로 전달된다. 직렬화 시 키는 사전순.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionScores(BTreeMap<String, f64>);

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// 점수 설정 (같은 레이블은 덮어씀)
    pub fn insert(&mut self, label: impl Into<String>, score: f64) {
        self.0.insert(label.into(), score);
    }

    /// 레이블 점수 조회
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    /// 감정 점수 조회
    pub fn score(&self, emotion: Emotion) -> Option<f64> {
        self.get(emotion.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// (레이블, 점수) 순회 (레이블 사전순)
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// 최고 점수 레이블.
    ///
    /// 동점이면 순회 순서상 먼저 나온 레이블을 유지한다. NaN은 선택되지 않는다.
    pub fn top(&self) -> Option<(&str, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in self.iter() {
            let better = match best {
                Some((_, best_score)) => score > best_score,
                None => !score.is_nan(),
            };
            if better {
                best = Some((label, score));
            }
        }
        best
    }
}

impl FromIterator<(String, f64)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<(Emotion, f64)> for EmotionScores {
    fn from_iter<I: IntoIterator<Item = (Emotion, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(e, s)| (e.as_str().to_string(), s))
                .collect(),
        )
    }
}

/// 얼굴 하나에 대한 검출 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// 얼굴 영역
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    /// 감정별 점수 (0.0 ~ 1.0)
    pub emotions: EmotionScores,
}

impl Detection {
    pub fn new(bbox: BoundingBox, emotions: EmotionScores) -> Self {
        Self { bbox, emotions }
    }

    /// 대표 감정 (최고 점수)
    pub fn top_emotion(&self) -> Option<(&str, f64)> {
        self.emotions.top()
    }
}
