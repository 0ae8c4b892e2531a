//! 오버레이 렌더링 계획.
//!
//! 검출 결과 하나를 "무엇을 어디에 어떤 색으로 그릴지"로 변환한다.
//! 브라우저 클라이언트의 `drawResults()`와 CLI 주석기(`moodlens-vision::annotate`)가
//! 같은 규칙을 따른다:
//! - 매 결과마다 오버레이를 지우고 다시 그린다
//! - 테두리 색은 대표 감정 색상, 알 수 없는 레이블은 [`FALLBACK_COLOR`]
//! - 레이블은 박스 위쪽, 배경 사각형 위에 `"Happy (90%)"` 형식

use crate::models::detection::{BoundingBox, Detection};
use crate::models::emotion::{color_for_label, Rgb, FALLBACK_COLOR};

/// 테두리 선 두께 (px)
pub const STROKE_WIDTH: u32 = 4;

/// 레이블 배경 높이 (px)
pub const LABEL_HEIGHT: i32 = 26;

/// 박스 상단에서 레이블 배경 상단까지 거리 (px)
pub const LABEL_OFFSET_Y: i32 = 28;

/// 레이블 좌우 여백 합계 (px)
pub const LABEL_PADDING: u32 = 10;

/// 상태 텍스트: 얼굴 없음
pub const NO_FACE_STATUS: &str = "No face detected";

/// 얼굴 하나에 대한 그리기 명령
#[derive(Debug, Clone, PartialEq)]
pub struct FaceOverlay {
    /// 테두리를 그릴 영역
    pub bbox: BoundingBox,
    /// 테두리/레이블 배경 색상
    pub color: Rgb,
    /// 대표 감정 레이블 (점수가 하나도 없으면 `None`)
    pub label: Option<String>,
}

impl FaceOverlay {
    /// 레이블 배경 사각형 (x, y, w, h).
    ///
    /// 폭은 렌더러가 측정한 텍스트 폭에 여백을 더한 값이다.
    /// 박스 좌표는 외부 검출기 출력이므로 포화 연산으로 계산한다.
    pub fn label_background(&self, text_width: u32) -> (i32, i32, u32, u32) {
        (
            self.bbox.x,
            self.bbox.y.saturating_sub(LABEL_OFFSET_Y),
            text_width.saturating_add(LABEL_PADDING),
            LABEL_HEIGHT as u32,
        )
    }

    /// 레이블 텍스트 기준점 (x, y). 좌측 정렬, 배경 안쪽
    pub fn label_origin(&self) -> (i32, i32) {
        (self.bbox.x.saturating_add(5), self.bbox.y.saturating_sub(10))
    }
}

/// 한 프레임 결과에 대한 전체 그리기 계획.
///
/// 계획을 적용할 때는 항상 오버레이 전체를 먼저 지운다.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    pub faces: Vec<FaceOverlay>,
    pub status: String,
}

impl OverlayPlan {
    pub fn from_detections(detections: &[Detection]) -> Self {
        let faces = detections
            .iter()
            .map(|d| match d.top_emotion() {
                Some((label, score)) => FaceOverlay {
                    bbox: d.bbox,
                    color: color_for_label(label),
                    label: Some(overlay_label(label, score)),
                },
                None => FaceOverlay {
                    bbox: d.bbox,
                    color: FALLBACK_COLOR,
                    label: None,
                },
            })
            .collect();

        Self {
            faces,
            status: status_text(detections.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// `"Happy (90%)"` 형식의 레이블. 첫 글자만 대문자, 점수는 반올림 정수 퍼센트.
pub fn overlay_label(label: &str, score: f64) -> String {
    let mut chars = label.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    format!("{} ({}%)", name, (score * 100.0).round() as i64)
}

/// 얼굴 수 요약 문구
pub fn status_text(count: usize) -> String {
    if count == 0 {
        NO_FACE_STATUS.to_string()
    } else {
        format!("{} face(s) detected", count)
    }
}
