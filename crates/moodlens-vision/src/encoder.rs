//! 프레임 JPEG 인코딩 (원격 검출기 전송용).

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};
use moodlens_core::error::CoreError;
use moodlens_core::models::frame::DecodedFrame;

/// 원격 전송 기본 JPEG 품질
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// RGB 프레임을 JPEG 바이트로 인코딩
pub fn encode_jpeg(frame: &DecodedFrame, quality: u8) -> Result<Vec<u8>, CoreError> {
    let quality = quality.clamp(1, 100);
    let mut out = Vec::with_capacity(frame.as_rgb().len() / 8);
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            frame.as_rgb(),
            frame.width(),
            frame.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| CoreError::Encode(format!("JPEG 인코딩 실패: {e}")))?;
    Ok(out)
}
