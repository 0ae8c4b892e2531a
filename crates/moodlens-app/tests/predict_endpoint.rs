//! `/predict` 엔드포인트 통합 테스트.
//!
//! 라우터를 직접 구동 (tower::ServiceExt::oneshot), 검출기는 스텁.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use image::{ImageFormat, Rgb, RgbImage};
use moodlens_core::config::WebConfig;
use moodlens_core::error::CoreError;
use moodlens_core::models::detection::{BoundingBox, Detection, EmotionScores};
use moodlens_core::models::frame::DecodedFrame;
use moodlens_core::ports::detector::EmotionDetector;
use moodlens_web::{router, AppState};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const BOUNDARY: &str = "moodlens-test-boundary";

// ============================================================
// 스텁 검출기
// ============================================================

/// 고정 결과 반환
struct FixedDetector(Vec<Detection>);

#[async_trait]
impl EmotionDetector for FixedDetector {
    async fn detect_emotions(&self, _frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        Ok(self.0.clone())
    }

    fn detector_name(&self) -> &str {
        "stub"
    }
}

/// 항상 실패
struct FailingDetector(fn() -> CoreError);

#[async_trait]
impl EmotionDetector for FailingDetector {
    async fn detect_emotions(&self, _frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        Err((self.0)())
    }

    fn detector_name(&self) -> &str {
        "failing"
    }
}

/// 검출 중 패닉
struct PanickingDetector;

#[async_trait]
impl EmotionDetector for PanickingDetector {
    async fn detect_emotions(&self, _frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        panic!("detector bug");
    }

    fn detector_name(&self) -> &str {
        "panicking"
    }
}

/// 응답 지연
struct SlowDetector;

#[async_trait]
impl EmotionDetector for SlowDetector {
    async fn detect_emotions(&self, _frame: DecodedFrame) -> Result<Vec<Detection>, CoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    fn detector_name(&self) -> &str {
        "slow"
    }
}

// ============================================================
// 헬퍼
// ============================================================

fn app_with(detector: impl EmotionDetector + 'static) -> Router {
    app_with_config(detector, WebConfig::default(), Duration::from_secs(5))
}

fn app_with_config(
    detector: impl EmotionDetector + 'static,
    config: WebConfig,
    detect_timeout: Duration,
) -> Router {
    let state = AppState {
        detector: Arc::new(detector),
        detect_timeout,
    };
    router(state, &config)
}

fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_pixel(64, 48, Rgb([120, 130, 140]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// multipart 파트: (필드 이름, 파일명, 데이터)
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/jpeg\r\n\r\n"
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn upload(data: &[u8]) -> Request<Body> {
    predict_request(multipart_body(&[("file", Some("frame.jpg"), data)]))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn happy_face() -> Detection {
    let emotions: EmotionScores = [
        ("angry", 0.0),
        ("disgust", 0.0),
        ("fear", 0.0),
        ("happy", 0.9),
        ("neutral", 0.05),
        ("sad", 0.05),
        ("surprise", 0.0),
    ]
    .into_iter()
    .map(|(l, s)| (l.to_string(), s))
    .collect();
    Detection::new(BoundingBox::new(12, 8, 30, 30), emotions)
}

// ============================================================
// 성공 경로
// ============================================================

#[tokio::test]
async fn image_without_faces_returns_empty_array() {
    let (status, body) = send(app_with(FixedDetector(vec![])), upload(&png_bytes())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn detections_are_serialized_as_box_and_emotions() {
    let (status, body) = send(
        app_with(FixedDetector(vec![happy_face()])),
        upload(&png_bytes()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["box"], json!([12, 8, 30, 30]));
    assert_eq!(body[0]["emotions"]["happy"], json!(0.9));
    assert_eq!(body[0]["emotions"].as_object().unwrap().len(), 7);
}

#[tokio::test]
async fn same_image_twice_yields_same_result() {
    let app = app_with(FixedDetector(vec![happy_face()]));
    let (_, first) = send(app.clone(), upload(&png_bytes())).await;
    let (_, second) = send(app, upload(&png_bytes())).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn first_file_part_wins_and_other_fields_are_ignored() {
    let png = png_bytes();
    let body = multipart_body(&[
        ("note", None, b"hello".as_slice()),
        ("file", Some("frame.jpg"), png.as_slice()),
        ("file", Some("second.jpg"), b"garbage".as_slice()),
    ]);
    let (status, _) = send(app_with(FixedDetector(vec![])), predict_request(body)).await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================
// 검증 실패
// ============================================================

#[tokio::test]
async fn missing_file_field_is_no_file_part() {
    let png = png_bytes();
    let body = multipart_body(&[("image", Some("frame.jpg"), png.as_slice())]);
    let (status, body) = send(app_with(FixedDetector(vec![])), predict_request(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn plain_form_value_is_no_file_part() {
    let body = multipart_body(&[("file", None, b"not a file".as_slice())]);
    let (status, body) = send(app_with(FixedDetector(vec![])), predict_request(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
async fn non_multipart_request_is_no_file_part() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(app_with(FixedDetector(vec![])), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file part");
}

#[tokio::test]
async fn empty_filename_is_no_selected_file() {
    let body = multipart_body(&[("file", Some(""), b"".as_slice())]);
    let (status, body) = send(app_with(FixedDetector(vec![])), predict_request(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No selected file");
}

#[tokio::test]
async fn undecodable_bytes_are_invalid_image() {
    let (status, body) = send(
        app_with(FixedDetector(vec![happy_face()])),
        upload(b"this is not an image"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid image");
}

#[tokio::test]
async fn zero_bytes_are_invalid_image() {
    let (status, body) = send(app_with(FixedDetector(vec![])), upload(b"")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid image");
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let config = WebConfig {
        max_upload_bytes: 1024,
        ..WebConfig::default()
    };
    let app = app_with_config(FixedDetector(vec![]), config, Duration::from_secs(5));
    let (status, body) = send(app, upload(&vec![0u8; 8 * 1024])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"], "Upload too large");
}

// ============================================================
// 검출기 실패
// ============================================================

#[tokio::test]
async fn detector_failure_is_generic_500() {
    let app = app_with(FailingDetector(|| {
        CoreError::Detector("tensor shape mismatch".into())
    }));
    let (status, body) = send(app, upload(&png_bytes())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Detection failed");
}

#[tokio::test]
async fn detector_panic_is_generic_500() {
    let (status, body) = send(app_with(PanickingDetector), upload(&png_bytes())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Detection failed");
    assert_eq!(body["status"], 500);
}

#[tokio::test]
async fn unreachable_detector_is_503() {
    let app = app_with(FailingDetector(|| {
        CoreError::Network("connection refused".into())
    }));
    let (status, body) = send(app, upload(&png_bytes())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Detector unavailable");
}

#[tokio::test]
async fn slow_detector_times_out() {
    let app = app_with_config(SlowDetector, WebConfig::default(), Duration::from_millis(50));
    let (status, body) = send(app, upload(&png_bytes())).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Detection timed out");
}

// ============================================================
// 기타 라우트
// ============================================================

#[tokio::test]
async fn health_reports_detector_name() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_with(FixedDetector(vec![])), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "detector": "stub"}));
}

#[tokio::test]
async fn index_serves_client_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app_with(FixedDetector(vec![]))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("Live Emotion Detection"));
    assert!(html.contains("/app.js"));
}

#[tokio::test]
async fn unknown_path_is_json_404() {
    let request = Request::builder()
        .uri("/missing")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_with(FixedDetector(vec![])), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found: /missing");
}
