//! 업로드 바이트 → 픽셀 버퍼 디코딩.
//!
//! 포맷은 바이트 시그니처로 추정한다 (파일명/Content-Type은 신뢰하지 않음).
//! 디코딩할 수 없으면 `CoreError::InvalidImage`.

use std::io::Cursor;

use image::{ImageReader, Limits, RgbImage};
use moodlens_core::error::CoreError;
use moodlens_core::models::frame::DecodedFrame;
use tracing::debug;

/// 허용하는 최대 이미지 변 길이 (px)
pub const MAX_DIMENSION: u32 = 8192;

/// 디코딩 중 최대 할당 크기 (바이트)
const MAX_DECODE_ALLOC: u64 = 256 * 1024 * 1024;

/// 이미지 바이트를 RGB8 프레임으로 디코딩
pub fn decode_image(bytes: &[u8]) -> Result<DecodedFrame, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::InvalidImage("빈 이미지 데이터".to_string()));
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::InvalidImage(format!("포맷 추정 실패: {e}")))?;

    let format = reader.format();
    if format.is_none() {
        return Err(CoreError::InvalidImage("알 수 없는 이미지 포맷".to_string()));
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    let image = reader
        .decode()
        .map_err(|e| CoreError::InvalidImage(e.to_string()))?;

    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    debug!(?format, width, height, bytes = bytes.len(), "이미지 디코딩");

    DecodedFrame::from_rgb(width, height, rgb.into_raw())
}

/// 프레임 → `image::RgbImage` (픽셀 복사)
pub fn to_rgb_image(frame: &DecodedFrame) -> Result<RgbImage, CoreError> {
    RgbImage::from_raw(frame.width(), frame.height(), frame.as_rgb().to_vec())
        .ok_or_else(|| CoreError::InvalidImage("픽셀 버퍼 변환 실패".to_string()))
}
