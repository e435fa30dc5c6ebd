// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer capture pipeline reading from PipeWire
//!
//! One pipeline per running session: `pipewiresrc` as the device input,
//! `appsink` as the output. Every frame is converted to RGBA before the
//! appsink so the preview widget and the photo pipeline share one layout.
//! The appsink callback doubles as the photo output: when a one-shot photo
//! request is pending, the next good frame fulfills it.

use super::types::{
    BackendError, BackendResult, CameraDevice, CameraFormat, CameraFrame, FrameSender,
    PhotoRequestSlot,
};
use crate::constants::{pipeline, timing};
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};

static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Camera capture pipeline
///
/// Owns the GStreamer pipeline for one camera. Dropping the value releases
/// the device; `stop()` does the same with error reporting.
pub struct CameraPipeline {
    pipeline: gstreamer::Pipeline,
    appsink: AppSink,
}

impl CameraPipeline {
    /// Create and start a capture pipeline for the given device.
    ///
    /// `format` constrains the negotiated resolution when known; `None`
    /// lets PipeWire pick the source's preferred mode.
    pub fn new(
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frame_sender: FrameSender,
        photo_requests: PhotoRequestSlot,
    ) -> BackendResult<Self> {
        info!(device = %device.name, format = ?format.map(|f| f.to_string()), "Creating camera pipeline");

        gstreamer::init().map_err(|e| BackendError::InitializationFailed(e.to_string()))?;

        gstreamer::ElementFactory::find("pipewiresrc").ok_or_else(|| {
            BackendError::NotAvailable("pipewiresrc element not found".to_string())
        })?;

        let pw_path_prop = determine_pipewire_path(&device.path);
        let caps_filter = build_caps_filter(format);
        let pipeline_str = build_pipeline_string(&pw_path_prop, &caps_filter);

        // PipeWire occasionally refuses a node that is still being released;
        // retry a few times before giving up.
        let mut last_error: Option<String> = None;
        let mut launched: Option<gstreamer::Pipeline> = None;
        for attempt in 1..=pipeline::CREATE_RETRIES {
            debug!(pipeline = %pipeline_str, attempt, "Launching pipeline");
            match gstreamer::parse::launch(&pipeline_str) {
                Ok(element) => match element.downcast::<gstreamer::Pipeline>() {
                    Ok(p) => {
                        launched = Some(p);
                        break;
                    }
                    Err(_) => {
                        last_error = Some("parsed element is not a pipeline".to_string());
                    }
                },
                Err(e) => {
                    last_error = Some(e.to_string());
                }
            }
            if attempt < pipeline::CREATE_RETRIES {
                warn!(attempt, error = ?last_error, "Pipeline launch failed, retrying");
                std::thread::sleep(std::time::Duration::from_millis(pipeline::RETRY_DELAY_MS));
            }
        }

        let pipeline = launched.ok_or_else(|| {
            BackendError::InitializationFailed(
                last_error.unwrap_or_else(|| "pipeline creation failed".to_string()),
            )
        })?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| BackendError::InitializationFailed("failed to get appsink".to_string()))?
            .dynamic_cast::<AppSink>()
            .map_err(|_| BackendError::InitializationFailed("failed to cast appsink".to_string()))?;

        // Low-latency preview: never block the source, drop stale frames.
        appsink.set_property("sync", false);
        appsink.set_property("max-buffers", pipeline::MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("enable-last-sample", false);

        appsink.set_callbacks(
            gstreamer_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    Self::on_new_sample(appsink, &frame_sender, &photo_requests)
                })
                .build(),
        );

        pipeline.set_state(gstreamer::State::Playing).map_err(|e| {
            BackendError::InitializationFailed(format!("failed to start pipeline: {}", e))
        })?;

        // Wait for the state change to complete
        let (result, state, pending) = pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::PIPELINE_START_TIMEOUT_SECS,
        ));
        debug!(result = ?result, state = ?state, pending = ?pending, "Pipeline state");
        if state != gstreamer::State::Playing {
            warn!("Pipeline is not in PLAYING state");
        }

        info!("Camera pipeline started");

        Ok(Self { pipeline, appsink })
    }

    /// Appsink callback: forward the frame to the preview channel and
    /// fulfill a pending photo request, if any.
    fn on_new_sample(
        appsink: &AppSink,
        frame_sender: &FrameSender,
        photo_requests: &PhotoRequestSlot,
    ) -> Result<gstreamer::FlowSuccess, gstreamer::FlowError> {
        let frame_start = Instant::now();
        let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

        let sample = appsink.pull_sample().map_err(|e| {
            if frame_num % 30 == 0 {
                error!(frame = frame_num, error = ?e, "Failed to pull sample");
            }
            gstreamer::FlowError::Eos
        })?;

        let buffer = sample.buffer().ok_or_else(|| {
            if frame_num % 30 == 0 {
                error!(frame = frame_num, "No buffer in sample");
            }
            gstreamer::FlowError::Error
        })?;

        // Incomplete DMA transfers arrive flagged as corrupted; skip them so
        // neither the preview nor a photo request sees a torn frame.
        if buffer.flags().contains(gstreamer::BufferFlags::CORRUPTED) {
            if frame_num % 30 == 0 {
                warn!(frame = frame_num, "Buffer marked as corrupted, skipping frame");
            }
            return Err(gstreamer::FlowError::Error);
        }

        let caps = sample.caps().ok_or_else(|| {
            if frame_num % 30 == 0 {
                error!(frame = frame_num, "No caps in sample");
            }
            gstreamer::FlowError::Error
        })?;

        let video_info = VideoInfo::from_caps(caps).map_err(|e| {
            if frame_num % 30 == 0 {
                error!(frame = frame_num, error = ?e, "Failed to get video info");
            }
            gstreamer::FlowError::Error
        })?;

        let map = buffer.map_readable().map_err(|e| {
            if frame_num % 30 == 0 {
                error!(frame = frame_num, error = ?e, "Failed to map buffer");
            }
            gstreamer::FlowError::Error
        })?;

        let frame = CameraFrame {
            width: video_info.width(),
            height: video_info.height(),
            data: Arc::from(map.as_slice()),
            stride: video_info.stride()[0] as u32,
            captured_at: frame_start,
        };

        // Photo output: a pending one-shot request gets this frame.
        let pending = photo_requests
            .lock()
            .ok()
            .and_then(|mut slot| slot.take());
        if let Some(responder) = pending {
            info!(
                frame = frame_num,
                width = frame.width,
                height = frame.height,
                "Fulfilling photo request"
            );
            if responder.send(frame.clone()).is_err() {
                warn!("Photo requester went away before delivery");
            }
        }

        // Preview: non-blocking send, dropping frames when the UI is busy.
        let mut sender = frame_sender.clone();
        match sender.try_send(frame) {
            Ok(_) => {
                if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(
                        frame = frame_num,
                        total_us = frame_start.elapsed().as_micros(),
                        "Frame forwarded"
                    );
                }
            }
            Err(e) => {
                if frame_num % 30 == 0 {
                    debug!(frame = frame_num, error = ?e, "Frame dropped (channel full)");
                }
            }
        }

        Ok(gstreamer::FlowSuccess::Ok)
    }

    /// Stop the pipeline and release the camera.
    pub fn stop(self) -> BackendResult<()> {
        info!("Stopping camera pipeline");

        // Clear callbacks first so no frame fires mid-teardown.
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| BackendError::Other(format!("failed to stop pipeline: {}", e)))?;

        let (result, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(
            timing::PIPELINE_STOP_TIMEOUT_SECS,
        ));
        match result {
            Ok(_) => info!(state = ?state, "Camera pipeline stopped"),
            Err(e) => debug!(error = ?e, state = ?state, "Pipeline state change had issues"),
        }

        Ok(())
    }
}

impl Drop for CameraPipeline {
    fn drop(&mut self) {
        self.appsink
            .set_callbacks(gstreamer_app::AppSinkCallbacks::builder().build());
        // Explicitly reach Null so the device is released immediately.
        let _ = self.pipeline.set_state(gstreamer::State::Null);
    }
}

/// Translate a device path into pipewiresrc properties.
fn determine_pipewire_path(device_path: &str) -> String {
    if device_path.is_empty() {
        // Empty path = PipeWire auto-selects the default camera
        return String::new();
    }

    if let Some(serial) = device_path.strip_prefix("pipewire-serial-") {
        format!("target-object={} ", serial)
    } else if let Some(node_id) = device_path.strip_prefix("pipewire-") {
        format!("target-object={} ", node_id)
    } else if device_path.starts_with("/dev/video") {
        // V4L2 device path exposed through PipeWire
        format!("path=v4l2:{} ", device_path)
    } else {
        warn!(device_path, "Unknown device path format, using path property");
        format!("path={} ", device_path)
    }
}

/// Build the resolution constraint for the RGBA caps, if a format is known.
fn build_caps_filter(format: Option<&CameraFormat>) -> String {
    match format {
        Some(f) => format!(",width=(int){},height=(int){}", f.width, f.height),
        None => String::new(),
    }
}

/// Assemble the full pipeline description.
fn build_pipeline_string(pw_path_prop: &str, caps_filter: &str) -> String {
    format!(
        "pipewiresrc {}do-timestamp=true ! \
        queue max-size-buffers=2 leaky=downstream ! \
        videoconvert ! \
        video/x-raw,format=RGBA{} ! \
        appsink name=sink",
        pw_path_prop, caps_filter
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipewire_paths_map_to_source_properties() {
        assert_eq!(determine_pipewire_path(""), "");
        assert_eq!(
            determine_pipewire_path("pipewire-serial-2146"),
            "target-object=2146 "
        );
        assert_eq!(determine_pipewire_path("pipewire-76"), "target-object=76 ");
        assert_eq!(
            determine_pipewire_path("/dev/video0"),
            "path=v4l2:/dev/video0 "
        );
    }

    #[test]
    fn pipeline_string_pins_rgba_output() {
        let s = build_pipeline_string("target-object=76 ", ",width=(int)1920,height=(int)1080");
        assert!(s.starts_with("pipewiresrc target-object=76 do-timestamp=true"));
        assert!(s.contains("video/x-raw,format=RGBA,width=(int)1920,height=(int)1080"));
        assert!(s.ends_with("appsink name=sink"));
    }

    #[test]
    fn caps_filter_is_empty_without_format() {
        assert_eq!(build_caps_filter(None), "");
    }
}
