// SPDX-License-Identifier: GPL-3.0-only

//! Frame conversion for the photo pipeline
//!
//! Camera frames arrive as RGBA with a row stride that may include padding.
//! Encoding wants tightly packed RGB, so conversion walks the frame row by
//! row, honoring the stride and dropping the alpha channel.

use super::PhotoError;
use crate::backends::camera::types::CameraFrame;
use image::RgbImage;

/// Convert an RGBA camera frame into a tightly packed RGB image.
pub fn frame_to_rgb(frame: &CameraFrame) -> Result<RgbImage, PhotoError> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let row_bytes = width * 4;

    if width == 0 || height == 0 {
        return Err(PhotoError::InvalidFrame("zero-sized frame".to_string()));
    }
    if stride < row_bytes {
        return Err(PhotoError::InvalidFrame(format!(
            "stride {} smaller than row width {}",
            stride, row_bytes
        )));
    }
    let required = stride * (height - 1) + row_bytes;
    if frame.data.len() < required {
        return Err(PhotoError::InvalidFrame(format!(
            "frame data {} bytes, {} required",
            frame.data.len(),
            required
        )));
    }

    let mut rgb = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row = &frame.data[y * stride..y * stride + row_bytes];
        for pixel in row.chunks_exact(4) {
            rgb.extend_from_slice(&pixel[..3]);
        }
    }

    RgbImage::from_raw(frame.width, frame.height, rgb)
        .ok_or_else(|| PhotoError::InvalidFrame("RGB buffer size mismatch".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(width: u32, height: u32, stride: u32, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data.as_slice()),
            stride,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn converts_packed_rgba() {
        // 2x2 frame: red, green / blue, white
        let data = vec![
            255, 0, 0, 255, 0, 255, 0, 255, //
            0, 0, 255, 255, 255, 255, 255, 255,
        ];
        let rgb = frame_to_rgb(&frame(2, 2, 8, data)).unwrap();

        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 255, 0]);
        assert_eq!(rgb.get_pixel(0, 1).0, [0, 0, 255]);
        assert_eq!(rgb.get_pixel(1, 1).0, [255, 255, 255]);
    }

    #[test]
    fn honors_row_padding() {
        // 1x2 frame with 4 padding bytes per row
        let data = vec![
            10, 20, 30, 255, 0, 0, 0, 0, //
            40, 50, 60, 255, 0, 0, 0, 0,
        ];
        let rgb = frame_to_rgb(&frame(1, 2, 8, data)).unwrap();

        assert_eq!(rgb.get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(rgb.get_pixel(0, 1).0, [40, 50, 60]);
    }

    #[test]
    fn rejects_truncated_frames() {
        let err = frame_to_rgb(&frame(2, 2, 8, vec![0; 8])).unwrap_err();
        assert!(matches!(err, PhotoError::InvalidFrame(_)));
    }

    #[test]
    fn rejects_undersized_stride() {
        let err = frame_to_rgb(&frame(2, 1, 4, vec![0; 8])).unwrap_err();
        assert!(matches!(err, PhotoError::InvalidFrame(_)));
    }
}
