// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use crate::flash::FlashMode;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Which way a camera points, as reported by the platform.
///
/// PipeWire exposes this through the `api.libcamera.location` node property
/// ("front", "back", "external"). Plain V4L2 webcams usually carry no
/// location; enumeration falls back to a name heuristic for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraFacing {
    /// User-facing camera
    Front,
    /// World-facing camera (the default capture device)
    #[default]
    Back,
    /// Externally attached camera (USB, capture card)
    External,
}

impl CameraFacing {
    /// Parse a facing from a PipeWire location property value.
    pub fn from_location(location: &str) -> Option<Self> {
        match location.trim().to_ascii_lowercase().as_str() {
            "front" => Some(CameraFacing::Front),
            "back" => Some(CameraFacing::Back),
            "external" => Some(CameraFacing::External),
            _ => None,
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraFacing::Front => write!(f, "front"),
            CameraFacing::Back => write!(f, "back"),
            CameraFacing::External => write!(f, "external"),
        }
    }
}

/// V4L2 device information resolved from PipeWire node properties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Name of the device (node.nick)
    pub card: String,
    /// Device path (e.g., /dev/video0)
    pub path: String,
    /// Real device path (resolved symlinks)
    pub real_path: String,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Path used to target the capture source (PipeWire serial or node ID)
    pub path: String,
    /// PipeWire node ID, used for format enumeration
    pub node_id: Option<String>,
    /// V4L2 device information when the node is backed by /dev/video*
    pub device_info: Option<DeviceInfo>,
    /// Which way the camera points
    pub facing: CameraFacing,
    /// Whether controllable flash hardware accompanies this camera
    pub flash_available: bool,
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    /// Frames per second; None when the device negotiates its own rate
    pub framerate: Option<u32>,
    /// FourCC code of the source format (e.g., "MJPG", "YUY2")
    pub pixel_format: String,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = self.framerate {
            write!(f, "{}x{} @ {}fps", self.width, self.height, fps)
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

/// A single RGBA frame from the camera
///
/// The pipeline converts every source format to RGBA before delivery, so
/// consumers (preview widget, photo pipeline) only deal with one layout.
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data, shared without copying
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may exceed width * 4 due to padding)
    pub stride: u32,
    /// Timestamp when the frame left the pipeline (for latency diagnostics)
    pub captured_at: Instant,
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("data", &format_args!("{} bytes", self.data.len()))
            .finish()
    }
}

/// Frame sender type for preview streams
pub type FrameSender = futures::channel::mpsc::Sender<CameraFrame>;

/// Frame receiver type for preview streams
pub type FrameReceiver = futures::channel::mpsc::Receiver<CameraFrame>;

/// One-shot capture settings, built fresh per photo request and discarded
/// after use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Flash mode resolved from the active device's flash availability
    pub flash: FlashMode,
    /// Image stabilization request, always enabled for stills
    pub stabilization: bool,
}

impl CaptureSettings {
    /// Build settings for a device: automatic flash when the device reports
    /// flash hardware, off otherwise; stabilization always on.
    pub fn for_device(device: &CameraDevice) -> Self {
        Self {
            flash: FlashMode::for_availability(device.flash_available),
            stabilization: true,
        }
    }
}

/// Slot holding at most one pending photo request.
///
/// The shutter handler places a oneshot sender here; the pipeline's frame
/// callback takes it and fulfills it with the next good frame. The Arc lives
/// in the backend (not inside the pipeline) so it survives pipeline restarts.
pub type PhotoRequestSlot = Arc<Mutex<Option<tokio::sync::oneshot::Sender<CameraFrame>>>>;

/// An in-flight photo request: the response channel plus the settings the
/// request was submitted with.
#[derive(Debug)]
pub struct PhotoRequest {
    pub settings: CaptureSettings,
    receiver: tokio::sync::oneshot::Receiver<CameraFrame>,
}

impl PhotoRequest {
    pub fn new(
        settings: CaptureSettings,
        receiver: tokio::sync::oneshot::Receiver<CameraFrame>,
    ) -> Self {
        Self { settings, receiver }
    }

    /// Wait for the frame, bounding the wait so a dead pipeline produces a
    /// structured error instead of a hang.
    pub async fn into_frame(self, timeout: std::time::Duration) -> BackendResult<CameraFrame> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(frame)) => Ok(frame),
            Ok(Err(_)) => Err(BackendError::CaptureFailed(
                "capture pipeline shut down before delivering a frame".to_string(),
            )),
            Err(_) => Err(BackendError::CaptureFailed(format!(
                "no frame delivered within {}ms",
                timeout.as_millis()
            ))),
        }
    }

    /// Blocking variant for synchronous callers (CLI, tests).
    pub fn blocking_frame(self, timeout: std::time::Duration) -> BackendResult<CameraFrame> {
        let deadline = Instant::now() + timeout;
        let mut receiver = self.receiver;
        loop {
            match receiver.try_recv() {
                Ok(frame) => return Ok(frame),
                Err(tokio::sync::oneshot::error::TryRecvError::Empty) => {
                    if Instant::now() >= deadline {
                        return Err(BackendError::CaptureFailed(format!(
                            "no frame delivered within {}ms",
                            timeout.as_millis()
                        )));
                    }
                    std::thread::sleep(std::time::Duration::from_millis(16));
                }
                Err(tokio::sync::oneshot::error::TryRecvError::Closed) => {
                    return Err(BackendError::CaptureFailed(
                        "capture pipeline shut down before delivering a frame".to_string(),
                    ));
                }
            }
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Capture stack is not available on this system (no PipeWire)
    NotAvailable(String),
    /// No camera device present
    DeviceNotFound(String),
    /// Camera hardware exists but this user cannot access it
    PermissionDenied(String),
    /// Operation requires a configured, running session
    NotReady,
    /// A photo request is already pending
    CaptureInProgress,
    /// Failed to build or start the capture pipeline
    InitializationFailed(String),
    /// A submitted photo request could not be fulfilled
    CaptureFailed(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::PermissionDenied(msg) => write!(f, "Camera access denied: {}", msg),
            BackendError::NotReady => write!(f, "Camera session is not ready"),
            BackendError::CaptureInProgress => write!(f, "A capture is already in progress"),
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::CaptureFailed(msg) => write!(f, "Capture failed: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(facing: CameraFacing, flash: bool) -> CameraDevice {
        CameraDevice {
            name: "Test Camera".to_string(),
            path: "pipewire-42".to_string(),
            node_id: Some("42".to_string()),
            device_info: None,
            facing,
            flash_available: flash,
        }
    }

    #[test]
    fn facing_parses_known_locations() {
        assert_eq!(
            CameraFacing::from_location("front"),
            Some(CameraFacing::Front)
        );
        assert_eq!(CameraFacing::from_location("Back"), Some(CameraFacing::Back));
        assert_eq!(
            CameraFacing::from_location(" external "),
            Some(CameraFacing::External)
        );
        assert_eq!(CameraFacing::from_location("sideways"), None);
    }

    #[test]
    fn capture_settings_follow_flash_availability() {
        let with_flash = CaptureSettings::for_device(&device(CameraFacing::Back, true));
        assert_eq!(with_flash.flash, FlashMode::Auto);
        assert!(with_flash.stabilization);

        let without_flash = CaptureSettings::for_device(&device(CameraFacing::Back, false));
        assert_eq!(without_flash.flash, FlashMode::Off);
        assert!(without_flash.stabilization);
    }

    #[test]
    fn photo_request_reports_dropped_pipeline() {
        let (sender, receiver) = tokio::sync::oneshot::channel::<CameraFrame>();
        let request = PhotoRequest::new(
            CaptureSettings {
                flash: FlashMode::Off,
                stabilization: true,
            },
            receiver,
        );
        drop(sender);
        let err = request
            .blocking_frame(std::time::Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, BackendError::CaptureFailed(_)));
    }
}
