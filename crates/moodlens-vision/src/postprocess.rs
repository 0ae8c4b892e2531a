//! 모델 출력 후처리.
//!
//! ONNX 런타임과 무관한 순수 함수들이다: 얼굴 후보 디코딩, NMS,
//! 감정 로짓 → 확률 변환, FER+ 레이블 매핑.

use moodlens_core::models::detection::{BoundingBox, EmotionScores};
use moodlens_core::models::emotion::Emotion;

/// NMS IoU 임계값
pub const NMS_IOU_THRESH: f64 = 0.3;

/// FER+ 모델 출력 순서
pub const FERPLUS_LABELS: [&str; 8] = [
    "neutral",
    "happiness",
    "surprise",
    "sadness",
    "anger",
    "disgust",
    "fear",
    "contempt",
];

/// 얼굴 후보 (정규화 좌표 0.0 ~ 1.0, `[x1, y1, x2, y2]`)
#[derive(Debug, Clone, PartialEq)]
pub struct FaceCandidate {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub score: f64,
}

impl FaceCandidate {
    /// 프레임 픽셀 좌표의 박스로 변환 (프레임 경계로 잘라냄)
    pub fn to_bounding_box(&self, frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let x1 = (self.x1 * fw).clamp(0.0, fw);
        let y1 = (self.y1 * fh).clamp(0.0, fh);
        let x2 = (self.x2 * fw).clamp(0.0, fw);
        let y2 = (self.y2 * fh).clamp(0.0, fh);

        let width = (x2 - x1).round() as i32;
        let height = (y2 - y1).round() as i32;
        if width <= 0 || height <= 0 {
            return None;
        }
        Some(BoundingBox::new(x1.round() as i32, y1.round() as i32, width, height))
    }
}

/// UltraFace 출력 디코딩.
///
/// `scores`는 앵커당 `[background, face]`, `boxes`는 앵커당 정규화 `[x1, y1, x2, y2]`.
pub fn decode_ultraface(scores: &[f32], boxes: &[f32], threshold: f32) -> Vec<FaceCandidate> {
    scores
        .chunks_exact(2)
        .zip(boxes.chunks_exact(4))
        .filter(|(s, _)| s[1] >= threshold)
        .map(|(s, b)| FaceCandidate {
            x1: b[0] as f64,
            y1: b[1] as f64,
            x2: b[2] as f64,
            y2: b[3] as f64,
            score: s[1] as f64,
        })
        .collect()
}

/// 점수 내림차순으로 정렬 후 겹치는 후보 제거
pub fn nms(candidates: &mut [FaceCandidate], iou_thresh: f64) -> Vec<FaceCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(candidates[i].clone());
        for j in (i + 1)..candidates.len() {
            if !suppressed[j] && iou(&candidates[i], &candidates[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

pub fn iou(a: &FaceCandidate, b: &FaceCandidate) -> f64 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    inter / (area_a + area_b - inter)
}

/// 수치 안정 softmax
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum <= 0.0 || !sum.is_finite() {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|v| v / sum).collect()
}

/// 소수점 둘째 자리 반올림
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// FER+ 레이블 → 응답 레이블. contempt 등 7종 밖의 레이블은 `None`.
pub fn ferplus_emotion(label: &str) -> Option<Emotion> {
    match label {
        "neutral" => Some(Emotion::Neutral),
        "happiness" => Some(Emotion::Happy),
        "surprise" => Some(Emotion::Surprise),
        "sadness" => Some(Emotion::Sad),
        "anger" => Some(Emotion::Angry),
        "disgust" => Some(Emotion::Disgust),
        "fear" => Some(Emotion::Fear),
        _ => None,
    }
}

/// FER+ 로짓 → 7종 감정 점수
pub fn ferplus_scores(logits: &[f32]) -> EmotionScores {
    softmax(logits)
        .into_iter()
        .zip(FERPLUS_LABELS)
        .filter_map(|(p, label)| ferplus_emotion(label).map(|e| (e, round2(p as f64))))
        .collect()
}
