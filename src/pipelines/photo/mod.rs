// SPDX-License-Identifier: GPL-3.0-only

//! Async photo capture pipeline
//!
//! ```text
//! Camera Backend → Conversion → Encoding → Disk I/O
//!       ↓
//! Preview continues uninterrupted
//! ```
//!
//! Conversion and encoding are CPU-bound and run on a blocking task; disk
//! I/O is async. Frames travel through the pipeline as `Arc<CameraFrame>`
//! so nothing is copied until conversion.

pub mod encoding;
pub mod processing;

pub use encoding::{EncodingQuality, PhotoEncoder};

use crate::backends::camera::types::CameraFrame;
use std::path::PathBuf;
use std::sync::Arc;

/// Photo pipeline errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// The frame does not describe a decodable RGBA image
    InvalidFrame(String),
    /// JPEG encoding failed
    EncodingFailed(String),
    /// Writing the photo to disk failed
    SaveFailed(String),
}

impl std::fmt::Display for PhotoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for PhotoError {}

/// Complete photo pipeline: convert → encode → save.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Create a pipeline encoding at the given quality
    pub fn new(quality: EncodingQuality) -> Self {
        Self {
            encoder: PhotoEncoder::new(quality),
        }
    }

    /// Run the full pipeline on one captured frame.
    ///
    /// Returns the path of the saved photo.
    pub async fn capture_and_save(
        &self,
        frame: Arc<CameraFrame>,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let encoder = self.encoder;

        // Conversion and encoding are CPU-bound; keep them off the runtime.
        let encoded = tokio::task::spawn_blocking(move || {
            let rgb = processing::frame_to_rgb(&frame)?;
            encoder.encode(&rgb)
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("encode task failed: {}", e)))??;

        self.encoder.save(encoded, &output_dir).await
    }
}
