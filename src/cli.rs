// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos headlessly

use std::path::PathBuf;
use std::time::Instant;
use viewfinder::backends::camera::enumeration;
use viewfinder::backends::camera::{CaptureSession, SessionPreset};
use viewfinder::constants::{pipeline, timing};
use viewfinder::pipelines::photo::{EncodingQuality, PhotoPipeline};

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let cameras = match enumeration::enumerate_cameras() {
        Ok(cameras) => cameras,
        Err(error) => {
            println!("{}", error);
            return Ok(());
        }
    };

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {} ({})", index, camera.name, camera.facing);

        let formats = enumeration::get_formats(camera);
        if !formats.is_empty() {
            // Group formats by resolution and show the best framerate
            let mut resolutions: Vec<(u32, u32, u32)> = Vec::new();
            for format in &formats {
                let fps = format.framerate.unwrap_or(30);
                if let Some(existing) = resolutions
                    .iter_mut()
                    .find(|(w, h, _)| *w == format.width && *h == format.height)
                {
                    if fps > existing.2 {
                        existing.2 = fps;
                    }
                } else {
                    resolutions.push((format.width, format.height, fps));
                }
            }

            // Sort by resolution (highest first)
            resolutions.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));

            let display_count = resolutions.len().min(3);
            let res_strs: Vec<String> = resolutions
                .iter()
                .take(display_count)
                .map(|(w, h, fps)| format!("{}x{}@{}fps", w, h, fps))
                .collect();

            println!("      Formats: {}", res_strs.join(", "));
        }
        println!();
    }

    Ok(())
}

/// Take a photo with the active (back-facing) camera
pub fn take_photo(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    gstreamer::init()?;

    let session = CaptureSession::new(SessionPreset::Photo);

    let selection = session.discover()?;
    let device = selection
        .active()
        .ok_or("No back-facing camera available")?
        .clone();
    println!("Using camera: {} ({})", device.name, device.facing);

    // Determine output directory
    let output_dir = if let Some(path) = output.as_ref() {
        if path.is_dir() {
            path.clone()
        } else {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| viewfinder::storage::photo_directory(None))
        }
    } else {
        viewfinder::storage::photo_directory(None)
    };
    std::fs::create_dir_all(&output_dir)?;

    // Start the capture session
    println!("Capturing...");
    let (sender, mut receiver) =
        futures::channel::mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);
    session.start(sender)?;

    // Let the camera warm up before requesting the photo; early frames are
    // dark while exposure settles.
    let start = Instant::now();
    while start.elapsed() < timing::CAPTURE_WARMUP {
        let _ = receiver.try_next();
        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    let request = session.request_photo()?;
    println!(
        "Settings: flash={}, stabilization={}",
        request.settings.flash, request.settings.stabilization
    );
    let frame = request.blocking_frame(timing::CAPTURE_TIMEOUT)?;

    session.shutdown()?;

    // Encode and save through the photo pipeline
    let photo_pipeline = PhotoPipeline::new(EncodingQuality::High);
    let rt = tokio::runtime::Runtime::new()?;
    let output_path = rt.block_on(
        photo_pipeline.capture_and_save(std::sync::Arc::new(frame), output_dir),
    )?;

    // If the user named a specific file, move the photo there
    if let Some(user_path) = output
        && !user_path.is_dir()
    {
        std::fs::rename(&output_path, &user_path)?;
        println!("Photo saved: {}", user_path.display());
        return Ok(());
    }

    println!("Photo saved: {}", output_path.display());
    Ok(())
}
