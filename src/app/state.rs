// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::types::{BackendError, CameraFrame};
use crate::backends::camera::{CameraSelection, CaptureSession};
use crate::config::Config;
use crate::flash::FlashDevice;
use cosmic::cosmic_config;
use std::sync::Arc;
use std::time::Instant;

/// Device discovery progress
#[derive(Debug, Clone, Default)]
pub enum DiscoveryState {
    /// Discovery task still running
    #[default]
    Pending,
    /// Discovery finished and designated an active device
    Ready,
    /// Discovery finished without a usable device
    Failed(BackendError),
}

impl DiscoveryState {
    /// Whether the camera subscription should run
    pub fn is_ready(&self) -> bool {
        matches!(self, DiscoveryState::Ready)
    }
}

/// Photo capture state machine
///
/// Idle → (shutter press) → Requesting → (frame or error) → Idle.
/// Only one request may be outstanding; the shutter is rejected while one
/// is pending.
#[derive(Debug, Default)]
pub enum CaptureState {
    /// No capture outstanding
    #[default]
    Idle,
    /// A photo request is pending with the pipeline
    Requesting {
        /// When the request was submitted
        started: Instant,
    },
}

impl CaptureState {
    /// Check if a capture is outstanding
    pub fn is_requesting(&self) -> bool {
        matches!(self, CaptureState::Requesting { .. })
    }

    /// Enter the requesting state
    pub fn begin() -> Self {
        CaptureState::Requesting {
            started: Instant::now(),
        }
    }

    /// Return to idle (consumes the pending marker)
    pub fn finish(&mut self) {
        *self = CaptureState::Idle;
    }
}

/// The application model stores app-specific state used to describe its
/// interface and drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Configuration handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// The camera capture session (owned, explicitly scoped)
    pub session: CaptureSession,
    /// Device discovery progress
    pub discovery: DiscoveryState,
    /// Photo capture state machine
    pub capture: CaptureState,
    /// Latest camera frame, kept for the photo pipeline
    pub current_frame: Option<Arc<CameraFrame>>,
    /// Cached preview handle for the latest frame
    pub preview_handle: Option<cosmic::widget::image::Handle>,
    /// Controllable flash LEDs discovered at startup
    pub flash_devices: Vec<FlashDevice>,
    /// Flash is currently lit (white overlay shown)
    pub flash_active: bool,
    /// Most recent user-facing status line (saved path, error)
    pub status: Option<String>,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    /// Device discovery finished
    CamerasDiscovered(Result<CameraSelection, BackendError>),
    /// The camera subscription failed to start the session
    SessionFailed(BackendError),
    /// New camera frame received from the pipeline
    CameraFrame(Arc<CameraFrame>),
    /// Shutter pressed
    Capture,
    /// Flash lead time elapsed, submit the photo request
    FlashComplete,
    /// The pipeline delivered the requested frame (or failed)
    PhotoCaptured(Result<Arc<CameraFrame>, BackendError>),
    /// The photo pipeline finished writing (path or error text)
    PhotoSaved(Result<String, String>),
    /// Configuration changed on disk
    UpdateConfig(Config),
}
