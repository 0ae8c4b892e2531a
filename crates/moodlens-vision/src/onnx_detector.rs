//! 로컬 ONNX 감정 검출기.
//!
//! 2단계 파이프라인:
//! 1. UltraFace RFB-320으로 얼굴 박스 검출 (320x240, `(p - 127) / 128`)
//! 2. 얼굴마다 64x64 그레이스케일 크롭 → FER+ 8-class 분류
//!
//! 추론은 블로킹이므로 `spawn_blocking`에서 실행한다.
//! `Session::run`이 `&mut`을 요구해서 세션마다 Mutex로 감싼다.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use moodlens_core::config::OnnxDetectorConfig;
use moodlens_core::error::CoreError;
use moodlens_core::models::detection::{BoundingBox, Detection};
use moodlens_core::models::frame::DecodedFrame;
use moodlens_core::ports::detector::EmotionDetector;
use ndarray::Array4;
use ort::session::Session;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::postprocess::{decode_ultraface, ferplus_scores, nms, NMS_IOU_THRESH};

/// UltraFace 입력 폭
const FACE_INPUT_WIDTH: usize = 320;
/// UltraFace 입력 높이
const FACE_INPUT_HEIGHT: usize = 240;
/// FER+ 입력 한 변
const EMOTION_INPUT_SIZE: usize = 64;

fn ort_err(e: impl std::fmt::Display) -> CoreError {
    CoreError::Detector(format!("ONNX 추론 실패: {e}"))
}

struct Pipeline {
    face_session: Mutex<Session>,
    emotion_session: Mutex<Session>,
    face_confidence: f32,
}

/// ONNX 기반 [`EmotionDetector`] 구현
pub struct OnnxEmotionDetector {
    pipeline: Arc<Pipeline>,
}

impl OnnxEmotionDetector {
    /// 두 모델을 로드. 파일이 없으면 `CoreError::Config`.
    pub fn new(config: &OnnxDetectorConfig) -> Result<Self, CoreError> {
        let face_session = load_session(&config.face_model)?;
        let emotion_session = load_session(&config.emotion_model)?;
        info!(
            face_model = %config.face_model.display(),
            emotion_model = %config.emotion_model.display(),
            "ONNX 검출기 로드 완료"
        );
        Ok(Self {
            pipeline: Arc::new(Pipeline {
                face_session: Mutex::new(face_session),
                emotion_session: Mutex::new(emotion_session),
                face_confidence: config.face_confidence,
            }),
        })
    }
}

fn load_session(path: &Path) -> Result<Session, CoreError> {
    if !path.exists() {
        return Err(CoreError::Config(format!(
            "모델 파일 없음: {}",
            path.display()
        )));
    }
    Session::builder()
        .map_err(ort_err)?
        .commit_from_file(path)
        .map_err(ort_err)
}

#[async_trait]
impl EmotionDetector for OnnxEmotionDetector {
    async fn detect_emotions(&self, frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        let pipeline = Arc::clone(&self.pipeline);
        tokio::task::spawn_blocking(move || pipeline.run(&frame))
            .await
            .map_err(|e| CoreError::Detector(format!("추론 태스크 실패: {e}")))?
    }

    fn detector_name(&self) -> &str {
        "onnx"
    }
}

impl Pipeline {
    fn run(&self, frame: &DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        let faces = self.detect_faces(frame)?;
        let mut detections = Vec::with_capacity(faces.len());
        for bbox in faces {
            let logits = self.classify(frame, bbox)?;
            detections.push(Detection::new(bbox, ferplus_scores(&logits)));
        }
        debug!(faces = detections.len(), "ONNX 검출 완료");
        Ok(detections)
    }

    fn detect_faces(&self, frame: &DecodedFrame) -> Result<Vec<BoundingBox>, CoreError> {
        let input = ort::value::Tensor::from_array(face_input(frame)).map_err(ort_err)?;

        let (scores, boxes) = {
            let mut session = self.face_session.lock();
            let outputs = session.run(ort::inputs![input]).map_err(ort_err)?;
            if outputs.len() < 2 {
                return Err(CoreError::Detector(format!(
                    "얼굴 모델 출력 개수 불일치: {}",
                    outputs.len()
                )));
            }
            let scores = outputs[0].try_extract_array::<f32>().map_err(ort_err)?;
            let boxes = outputs[1].try_extract_array::<f32>().map_err(ort_err)?;
            (
                scores.iter().copied().collect::<Vec<f32>>(),
                boxes.iter().copied().collect::<Vec<f32>>(),
            )
        };

        let mut candidates = decode_ultraface(&scores, &boxes, self.face_confidence);
        let kept = nms(&mut candidates, NMS_IOU_THRESH);
        Ok(kept
            .iter()
            .filter_map(|c| c.to_bounding_box(frame.width(), frame.height()))
            .collect())
    }

    fn classify(&self, frame: &DecodedFrame, bbox: BoundingBox) -> Result<Vec<f32>, CoreError> {
        let input = ort::value::Tensor::from_array(emotion_input(frame, bbox)).map_err(ort_err)?;

        let mut session = self.emotion_session.lock();
        let outputs = session.run(ort::inputs![input]).map_err(ort_err)?;
        let logits = outputs[0].try_extract_array::<f32>().map_err(ort_err)?;
        Ok(logits.iter().copied().collect())
    }
}

// ---------------------------------------------------------------------------
// 전처리
// ---------------------------------------------------------------------------

/// 프레임 → UltraFace 입력 `[1, 3, 240, 320]` (최근접 리샘플)
fn face_input(frame: &DecodedFrame) -> Array4<f32> {
    let src_w = frame.width() as usize;
    let src_h = frame.height() as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, FACE_INPUT_HEIGHT, FACE_INPUT_WIDTH));

    for y in 0..FACE_INPUT_HEIGHT {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / FACE_INPUT_HEIGHT as f64) as usize)
            .min(src_h - 1);
        for x in 0..FACE_INPUT_WIDTH {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / FACE_INPUT_WIDTH as f64) as usize)
                .min(src_w - 1);
            if let Some(px) = frame.pixel(src_x as u32, src_y as u32) {
                for c in 0..3 {
                    tensor[[0, c, y, x]] = (px[c] as f32 - 127.0) / 128.0;
                }
            }
        }
    }
    tensor
}

/// 얼굴 영역 → FER+ 입력 `[1, 1, 64, 64]` (그레이스케일, 0 ~ 255)
fn emotion_input(frame: &DecodedFrame, bbox: BoundingBox) -> Array4<f32> {
    let s = EMOTION_INPUT_SIZE;
    let mut tensor = Array4::<f32>::zeros((1, 1, s, s));
    let max_x = frame.width().saturating_sub(1) as f64;
    let max_y = frame.height().saturating_sub(1) as f64;

    for y in 0..s {
        let src_y = (bbox.y as f64 + (y as f64 + 0.5) * bbox.height as f64 / s as f64)
            .clamp(0.0, max_y) as u32;
        for x in 0..s {
            let src_x = (bbox.x as f64 + (x as f64 + 0.5) * bbox.width as f64 / s as f64)
                .clamp(0.0, max_x) as u32;
            if let Some([r, g, b]) = frame.pixel(src_x, src_y) {
                tensor[[0, 0, y, x]] = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            }
        }
    }
    tensor
}
