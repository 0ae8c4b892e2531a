//! 디코딩된 프레임 (검출기 입력 픽셀 버퍼).
//!
//! 요청 하나 동안만 존재한다. 픽셀 데이터는 `Arc`로 공유되어
//! 블로킹 스레드풀로 넘길 때 복사가 일어나지 않는다.

use std::sync::Arc;

use crate::error::CoreError;

/// RGB8 픽셀 버퍼 (행 우선, 패딩 없음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    width: u32,
    height: u32,
    rgb: Arc<[u8]>,
}

impl DecodedFrame {
    /// 픽셀 버퍼로 프레임 생성. 길이가 `width * height * 3`과 다르면 에러.
    pub fn from_rgb(width: u32, height: u32, rgb: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize * 3;
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImage(format!(
                "빈 프레임: {}x{}",
                width, height
            )));
        }
        if rgb.len() != expected {
            return Err(CoreError::InvalidImage(format!(
                "픽셀 버퍼 길이 불일치: {} (예상 {})",
                rgb.len(),
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            rgb: rgb.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 원시 RGB 바이트
    pub fn as_rgb(&self) -> &[u8] {
        &self.rgb
    }

    /// (x, y) 픽셀. 범위 밖이면 `None`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.rgb[i], self.rgb[i + 1], self.rgb[i + 2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer() {
        let result = DecodedFrame::from_rgb(2, 2, vec![0; 11]);
        assert!(matches!(result, Err(CoreError::InvalidImage(_))));
    }

    #[test]
    fn rejects_zero_sized_frame() {
        assert!(DecodedFrame::from_rgb(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn pixel_lookup() {
        let mut data = vec![0u8; 2 * 2 * 3];
        data[9..12].copy_from_slice(&[1, 2, 3]);
        let frame = DecodedFrame::from_rgb(2, 2, data).unwrap();
        assert_eq!(frame.pixel(1, 1), Some([1, 2, 3]));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn clone_shares_pixels() {
        let frame = DecodedFrame::from_rgb(1, 1, vec![9, 9, 9]).unwrap();
        let copy = frame.clone();
        assert_eq!(frame.as_rgb().as_ptr(), copy.as_rgb().as_ptr());
    }
}
