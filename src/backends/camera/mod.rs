// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! ```text
//! ┌─────────────────────┐
//! │   UI Layer (App)    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   CaptureSession    │  ← Lifecycle, device selection, photo requests
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface (mockable in tests)
//! └──────────┬──────────┘
//!            │
//!            ▼
//!       ┌────────┐
//!       │PipeWire│  ← Concrete implementation
//!       └────────┘
//! ```

pub mod enumeration;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod types;

pub use selection::CameraSelection;
pub use session::{CaptureSession, SessionPreset};
pub use types::*;

use pipeline::CameraPipeline;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Camera backend trait
///
/// All camera backends provide device enumeration, pipeline lifecycle, and
/// one-shot photo requests. The session layer owns a boxed backend, which
/// keeps the lifecycle logic testable against a mock.
pub trait CameraBackend: Send + Sync {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>>;

    /// Get supported formats for a specific camera device
    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat>;

    /// Attach the device as the capture input and start streaming frames
    /// into `frames`. Must be called before any photo request.
    fn initialize(
        &mut self,
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frames: FrameSender,
    ) -> BackendResult<()>;

    /// Stop streaming and release the camera device. After shutdown, the
    /// backend must be reinitialized before use.
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Check if the backend is currently initialized and streaming
    fn is_initialized(&self) -> bool;

    /// Submit a one-shot photo request.
    ///
    /// The returned receiver yields the next good frame. At most one request
    /// may be pending; a second submission fails with `CaptureInProgress`.
    fn request_photo(&self) -> BackendResult<tokio::sync::oneshot::Receiver<CameraFrame>>;

    /// Get the currently active camera device (if initialized)
    fn current_device(&self) -> Option<&CameraDevice>;
}

/// Get a concrete backend instance (PipeWire only)
pub fn get_backend() -> Box<dyn CameraBackend> {
    Box::new(PipeWireBackend::new())
}

/// PipeWire camera backend
///
/// Owns at most one running capture pipeline plus the shared photo-request
/// slot. The slot lives here (not in the pipeline) so a pending request is
/// observable across pipeline restarts.
pub struct PipeWireBackend {
    pipeline: Option<CameraPipeline>,
    current_device: Option<CameraDevice>,
    photo_requests: PhotoRequestSlot,
}

impl PipeWireBackend {
    pub fn new() -> Self {
        Self {
            pipeline: None,
            current_device: None,
            photo_requests: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for PipeWireBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for PipeWireBackend {
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        enumeration::enumerate_cameras()
    }

    fn get_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        enumeration::get_formats(device)
    }

    fn initialize(
        &mut self,
        device: &CameraDevice,
        format: Option<&CameraFormat>,
        frames: FrameSender,
    ) -> BackendResult<()> {
        if let Some(old) = self.pipeline.take() {
            warn!("Backend already initialized; replacing pipeline");
            let _ = old.stop();
        }

        let pipeline =
            CameraPipeline::new(device, format, frames, Arc::clone(&self.photo_requests))?;
        self.pipeline = Some(pipeline);
        self.current_device = Some(device.clone());

        info!(device = %device.name, "PipeWire backend initialized");
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        self.current_device = None;

        // A pending photo request cannot complete once the pipeline is gone;
        // dropping its sender surfaces a structured error at the requester.
        if let Ok(mut slot) = self.photo_requests.lock()
            && slot.take().is_some()
        {
            warn!("Shutting down with a photo request pending");
        }

        match self.pipeline.take() {
            Some(pipeline) => pipeline.stop(),
            None => Ok(()),
        }
    }

    fn is_initialized(&self) -> bool {
        self.pipeline.is_some()
    }

    fn request_photo(&self) -> BackendResult<tokio::sync::oneshot::Receiver<CameraFrame>> {
        if self.pipeline.is_none() {
            return Err(BackendError::NotReady);
        }

        let mut slot = self
            .photo_requests
            .lock()
            .map_err(|_| BackendError::Other("photo request slot poisoned".to_string()))?;

        // A requester that timed out drops its receiver; such a request no
        // longer counts as pending and its slot can be reclaimed.
        if let Some(pending) = slot.as_ref()
            && !pending.is_closed()
        {
            return Err(BackendError::CaptureInProgress);
        }

        let (sender, receiver) = tokio::sync::oneshot::channel();
        *slot = Some(sender);
        Ok(receiver)
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.current_device.as_ref()
    }
}
