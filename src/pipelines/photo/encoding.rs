// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! The photo output uses one fixed codec: JPEG. The encoder is configured
//! once per pipeline and never changes for the lifetime of the session.

use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File extension for the fixed photo codec
pub const PHOTO_EXTENSION: &str = "jpg";

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingQuality {
    /// Low quality (high compression)
    Low,
    /// Medium quality (balanced)
    Medium,
    /// High quality (low compression)
    #[default]
    High,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Low => 60,
            EncodingQuality::Medium => 80,
            EncodingQuality::High => 92,
        }
    }
}

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG photo encoder with a fixed quality
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoEncoder {
    quality: EncodingQuality,
}

impl PhotoEncoder {
    pub fn new(quality: EncodingQuality) -> Self {
        Self { quality }
    }

    /// Encode an RGB image to JPEG bytes.
    pub fn encode(&self, image: &RgbImage) -> Result<EncodedImage, super::PhotoError> {
        let (width, height) = image.dimensions();
        let mut data = Vec::new();

        let mut encoder = JpegEncoder::new_with_quality(&mut data, self.quality.jpeg_quality());
        encoder
            .encode_image(image)
            .map_err(|e| super::PhotoError::EncodingFailed(e.to_string()))?;

        debug!(
            width,
            height,
            bytes = data.len(),
            quality = self.quality.jpeg_quality(),
            "Photo encoded"
        );

        Ok(EncodedImage {
            data,
            width,
            height,
        })
    }

    /// Write an encoded image to a timestamped file in `output_dir`.
    pub async fn save(
        &self,
        encoded: EncodedImage,
        output_dir: &Path,
    ) -> Result<PathBuf, super::PhotoError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| super::PhotoError::SaveFailed(e.to_string()))?;

        let output_path = crate::storage::timestamped_photo_path(output_dir, PHOTO_EXTENSION);

        tokio::fs::write(&output_path, &encoded.data)
            .await
            .map_err(|e| super::PhotoError::SaveFailed(e.to_string()))?;

        info!(
            path = %output_path.display(),
            width = encoded.width,
            height = encoded.height,
            "Photo saved"
        );

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_maps_to_jpeg_values() {
        assert_eq!(EncodingQuality::Low.jpeg_quality(), 60);
        assert_eq!(EncodingQuality::Medium.jpeg_quality(), 80);
        assert_eq!(EncodingQuality::High.jpeg_quality(), 92);
    }

    #[test]
    fn encodes_valid_jpeg() {
        let image = RgbImage::from_pixel(16, 16, image::Rgb([128, 64, 32]));
        let encoded = PhotoEncoder::new(EncodingQuality::High)
            .encode(&image)
            .unwrap();

        assert_eq!((encoded.width, encoded.height), (16, 16));
        // JPEG SOI marker
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
    }
}
