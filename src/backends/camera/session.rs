// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle
//!
//! `CaptureSession` is the owned, explicitly scoped resource behind the
//! single camera screen: it is created with a fixed quality preset, runs
//! discovery once, wires the active device into a pipeline on `start`, and
//! releases everything on `shutdown`. Every read of possibly-absent state
//! (no active device, session not running) returns a typed error instead of
//! panicking.

use super::selection::CameraSelection;
use super::types::*;
use super::{CameraBackend, get_backend};
use std::sync::{Arc, Mutex};
use tracing::info;

/// Fixed session quality preset, set at construction and never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPreset {
    /// Still photography: highest available resolution, unconstrained rate
    #[default]
    Photo,
}

impl SessionPreset {
    /// Choose the capture format for a device under this preset.
    ///
    /// Photo preset picks the highest-resolution format the device offers;
    /// with no advertised formats the source negotiates freely.
    pub fn select_format(&self, formats: &[CameraFormat]) -> Option<CameraFormat> {
        match self {
            SessionPreset::Photo => formats
                .iter()
                .max_by_key(|f| u64::from(f.width) * u64::from(f.height))
                .cloned(),
        }
    }
}

/// Internal session state
struct SessionState {
    backend: Box<dyn CameraBackend>,
    selection: CameraSelection,
}

/// Camera capture session
///
/// Thread-safe and cheap to clone; all clones share one backend.
#[derive(Clone)]
pub struct CaptureSession {
    state: Arc<Mutex<SessionState>>,
    preset: SessionPreset,
}

impl CaptureSession {
    /// Create a session over the platform backend.
    pub fn new(preset: SessionPreset) -> Self {
        info!(?preset, "Creating capture session");
        Self::with_backend(preset, get_backend())
    }

    /// Create a session over a specific backend (used by tests).
    pub fn with_backend(preset: SessionPreset, backend: Box<dyn CameraBackend>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                backend,
                selection: CameraSelection::default(),
            })),
            preset,
        }
    }

    /// The fixed quality preset this session was configured with.
    pub fn preset(&self) -> SessionPreset {
        self.preset
    }

    /// Run device discovery and classify the result.
    ///
    /// Propagates the backend's distinction between "no camera present" and
    /// "camera present but access denied".
    pub fn discover(&self) -> BackendResult<CameraSelection> {
        let mut state = self.lock()?;
        let devices = state.backend.enumerate_cameras()?;
        state.selection = CameraSelection::classify(&devices);
        Ok(state.selection.clone())
    }

    /// The most recent classification result.
    pub fn selection(&self) -> BackendResult<CameraSelection> {
        Ok(self.lock()?.selection.clone())
    }

    /// The active device, if discovery designated one.
    pub fn active_device(&self) -> BackendResult<Option<CameraDevice>> {
        Ok(self.lock()?.selection.active().cloned())
    }

    /// Wire the active device into a capture pipeline and start streaming
    /// frames into `frames`.
    pub fn start(&self, frames: FrameSender) -> BackendResult<()> {
        let mut state = self.lock()?;

        let device = state.selection.active().cloned().ok_or(BackendError::NotReady)?;

        let formats = state.backend.get_formats(&device);
        let format = self.preset.select_format(&formats);
        info!(
            device = %device.name,
            format = ?format.as_ref().map(|f| f.to_string()),
            "Starting capture session"
        );

        state.backend.initialize(&device, format.as_ref(), frames)
    }

    /// Release the pipeline and the camera device. Idempotent.
    pub fn shutdown(&self) -> BackendResult<()> {
        info!("Shutting down capture session");
        self.lock()?.backend.shutdown()
    }

    /// Whether the session pipeline is running.
    pub fn is_running(&self) -> bool {
        self.lock()
            .map(|state| state.backend.is_initialized())
            .unwrap_or(false)
    }

    /// Build fresh one-shot capture settings for the active device.
    ///
    /// Fails with `NotReady` when discovery designated no active device.
    pub fn capture_settings(&self) -> BackendResult<CaptureSettings> {
        let state = self.lock()?;
        let device = state.selection.active().ok_or(BackendError::NotReady)?;
        Ok(CaptureSettings::for_device(device))
    }

    /// Submit a one-shot photo request.
    ///
    /// Fails with `NotReady` when no device is active or the pipeline is not
    /// running, and with `CaptureInProgress` while a request is pending.
    pub fn request_photo(&self) -> BackendResult<PhotoRequest> {
        let state = self.lock()?;

        let device = state.selection.active().ok_or(BackendError::NotReady)?;
        let settings = CaptureSettings::for_device(device);

        let receiver = state.backend.request_photo()?;
        info!(?settings, "Photo request submitted");
        Ok(PhotoRequest::new(settings, receiver))
    }

    fn lock(&self) -> BackendResult<std::sync::MutexGuard<'_, SessionState>> {
        self.state
            .lock()
            .map_err(|_| BackendError::Other("session state poisoned".to_string()))
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let running = self.is_running();
        f.debug_struct("CaptureSession")
            .field("preset", &self.preset)
            .field("running", &running)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_preset_picks_highest_resolution() {
        let formats = vec![
            CameraFormat {
                width: 1280,
                height: 720,
                framerate: Some(30),
                pixel_format: "MJPG".to_string(),
            },
            CameraFormat {
                width: 1920,
                height: 1080,
                framerate: Some(30),
                pixel_format: "MJPG".to_string(),
            },
            CameraFormat {
                width: 640,
                height: 480,
                framerate: Some(60),
                pixel_format: "YUY2".to_string(),
            },
        ];

        let chosen = SessionPreset::Photo.select_format(&formats).unwrap();
        assert_eq!((chosen.width, chosen.height), (1920, 1080));
    }

    #[test]
    fn photo_preset_accepts_unknown_formats() {
        assert!(SessionPreset::Photo.select_format(&[]).is_none());
    }
}
