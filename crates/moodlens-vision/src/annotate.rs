//! 오버레이 계획을 정지 이미지에 렌더링.
//!
//! 브라우저 오버레이와 같은 기하를 사용한다: 테두리는 박스 경계를 중심으로
//! [`STROKE_WIDTH`] 두께, 레이블 배경은 박스 위쪽에 감정 색상으로 채운다.

use std::path::Path;

use image::{Rgb, RgbImage};
use moodlens_core::error::CoreError;
use moodlens_core::models::detection::BoundingBox;
use moodlens_core::models::emotion::{self, LABEL_TEXT_COLOR};
use moodlens_core::models::frame::DecodedFrame;
use moodlens_core::overlay::{OverlayPlan, STROKE_WIDTH};
use tracing::debug;

use crate::decode::to_rgb_image;
use crate::font;

/// 레이블 폰트 배율 (5x7 → 10x14)
pub const LABEL_FONT_SCALE: u32 = 2;

fn pixel(color: emotion::Rgb) -> Rgb<u8> {
    Rgb([color.r, color.g, color.b])
}

/// 계획의 모든 얼굴을 이미지 위에 그린다
pub fn draw_plan(image: &mut RgbImage, plan: &OverlayPlan) {
    for face in &plan.faces {
        let color = pixel(face.color);
        stroke_rect(image, face.bbox, color);

        if let Some(label) = &face.label {
            let text_width = font::text_width(label, LABEL_FONT_SCALE);
            let (bx, by, bw, bh) = face.label_background(text_width);
            fill_rect(image, bx as i64, by as i64, bw as i64, bh as i64, color);

            let (tx, ty) = face.label_origin();
            font::draw_text(image, tx, ty, label, pixel(LABEL_TEXT_COLOR), LABEL_FONT_SCALE);
        }
    }
}

/// 프레임 복사본에 계획을 그린 이미지 반환
pub fn annotate(frame: &DecodedFrame, plan: &OverlayPlan) -> Result<RgbImage, CoreError> {
    let mut image = to_rgb_image(frame)?;
    draw_plan(&mut image, plan);
    Ok(image)
}

/// 주석 이미지를 파일로 저장 (포맷은 확장자로 결정)
pub fn save_annotated(
    frame: &DecodedFrame,
    plan: &OverlayPlan,
    path: &Path,
) -> Result<(), CoreError> {
    let image = annotate(frame, plan)?;
    image
        .save(path)
        .map_err(|e| CoreError::Encode(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), faces = plan.faces.len(), "주석 이미지 저장");
    Ok(())
}

/// 박스 좌표는 외부 검출기 출력이라 i64로 넓혀 계산한 뒤 클리핑한다
fn stroke_rect(image: &mut RgbImage, bbox: BoundingBox, color: Rgb<u8>) {
    let half = (STROKE_WIDTH / 2) as i64;
    let line = STROKE_WIDTH as i64;
    let (x, y) = (bbox.x as i64, bbox.y as i64);
    let (width, height) = (bbox.width as i64, bbox.height as i64);

    fill_rect(image, x - half, y - half, width + line, line, color);
    fill_rect(image, x - half, y + height - half, width + line, line, color);
    fill_rect(image, x - half, y - half, line, height + line, color);
    fill_rect(image, x + width - half, y - half, line, height + line, color);
}

fn fill_rect(image: &mut RgbImage, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
    if w <= 0 || h <= 0 {
        return;
    }
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(image.width() as i64);
    let y1 = (y + h).min(image.height() as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            image.put_pixel(px as u32, py as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodlens_core::models::detection::{Detection, EmotionScores};
    use moodlens_core::models::emotion::{Emotion, FALLBACK_COLOR};

    const GRAY: [u8; 3] = [50, 50, 50];

    fn gray_frame(w: u32, h: u32) -> DecodedFrame {
        let rgb = GRAY.iter().copied().cycle().take((w * h * 3) as usize).collect();
        DecodedFrame::from_rgb(w, h, rgb).unwrap()
    }

    fn plan_for(bbox: BoundingBox, pairs: &[(&str, f64)]) -> OverlayPlan {
        let emotions: EmotionScores = pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect();
        OverlayPlan::from_detections(&[Detection::new(bbox, emotions)])
    }

    #[test]
    fn border_and_label_use_emotion_color() {
        let frame = gray_frame(200, 200);
        let plan = plan_for(BoundingBox::new(60, 80, 80, 80), &[("happy", 0.9)]);
        let image = annotate(&frame, &plan).unwrap();
        let happy = pixel(Emotion::Happy.color());

        // 테두리는 경계 양쪽으로 2px
        assert_eq!(image.get_pixel(60, 120), &happy);
        assert_eq!(image.get_pixel(58, 120), &happy);
        assert_eq!(image.get_pixel(61, 120), &happy);
        assert_eq!(image.get_pixel(62, 120), &Rgb(GRAY));
        assert_eq!(image.get_pixel(141, 120), &happy);
        // 내부는 그대로
        assert_eq!(image.get_pixel(100, 120), &Rgb(GRAY));
        // 레이블 배경 좌상단 모서리 (y - 28)
        assert_eq!(image.get_pixel(60, 52), &happy);
        assert_eq!(image.get_pixel(60, 51), &Rgb(GRAY));
    }

    #[test]
    fn label_text_is_drawn_in_dark_ink() {
        let frame = gray_frame(200, 200);
        let plan = plan_for(BoundingBox::new(60, 80, 80, 80), &[("happy", 0.9)]);
        let image = annotate(&frame, &plan).unwrap();

        // "H"의 왼쪽 세로획: 원점 (65, 70), 글리프 상단 70 - 14
        assert_eq!(image.get_pixel(65, 56), &pixel(LABEL_TEXT_COLOR));
        assert_eq!(image.get_pixel(66, 69), &pixel(LABEL_TEXT_COLOR));
    }

    #[test]
    fn empty_plan_leaves_frame_untouched() {
        let frame = gray_frame(32, 32);
        let image = annotate(&frame, &OverlayPlan::from_detections(&[])).unwrap();
        assert!(image.pixels().all(|p| *p == Rgb(GRAY)));
    }

    #[test]
    fn face_without_scores_gets_border_only() {
        let frame = gray_frame(100, 100);
        let plan = plan_for(BoundingBox::new(40, 40, 20, 20), &[]);
        let image = annotate(&frame, &plan).unwrap();
        assert_eq!(image.get_pixel(40, 50), &pixel(FALLBACK_COLOR));
        assert_eq!(image.get_pixel(40, 15), &Rgb(GRAY));
    }

    #[test]
    fn boxes_touching_edges_are_clipped() {
        let frame = gray_frame(50, 50);
        let plan = plan_for(BoundingBox::new(-10, 0, 80, 80), &[("sad", 0.6)]);
        let image = annotate(&frame, &plan).unwrap();
        assert_eq!(image.get_pixel(10, 1), &pixel(Emotion::Sad.color()));
    }

    #[test]
    fn oversized_box_does_not_overflow() {
        let frame = gray_frame(8, 8);
        let plan = plan_for(BoundingBox::new(0, 0, i32::MAX, 10), &[("happy", 0.9)]);
        let image = annotate(&frame, &plan).unwrap();
        // 윗변만 프레임 안에 걸친다
        assert_eq!(image.get_pixel(4, 0), &pixel(Emotion::Happy.color()));
        assert_eq!(image.get_pixel(4, 4), &Rgb(GRAY));
    }

    #[test]
    fn extreme_coordinates_are_clipped() {
        let frame = gray_frame(8, 8);
        for bbox in [
            BoundingBox::new(i32::MIN, i32::MIN, 10, 10),
            BoundingBox::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX),
            BoundingBox::new(i32::MAX, i32::MAX, i32::MAX, i32::MAX),
            BoundingBox::new(0, i32::MIN, 4, i32::MAX),
        ] {
            let image = annotate(&frame, &plan_for(bbox, &[("sad", 0.6)])).unwrap();
            assert_eq!(image.dimensions(), (8, 8));
        }
    }

    #[test]
    fn saves_png_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.png");
        let frame = gray_frame(64, 64);
        let plan = plan_for(BoundingBox::new(10, 30, 20, 20), &[("angry", 0.7)]);

        save_annotated(&frame, &plan, &path).unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (64, 64));
        assert_eq!(saved.get_pixel(10, 40), &pixel(Emotion::Angry.color()));
    }

    #[test]
    fn unknown_extension_is_encode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotated.unknownext");
        let frame = gray_frame(8, 8);
        let result = save_annotated(&frame, &OverlayPlan::from_detections(&[]), &path);
        assert!(matches!(result, Err(CoreError::Encode(_))));
    }
}
