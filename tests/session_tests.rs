// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session lifecycle
//!
//! A mock backend stands in for PipeWire so the session's guards and the
//! capture request flow can be exercised without camera hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use viewfinder::backends::camera::types::*;
use viewfinder::backends::camera::{CameraBackend, CaptureSession, SessionPreset};
use viewfinder::flash::FlashMode;

/// Mock backend: configurable device list, in-memory photo request slot.
struct MockBackend {
    devices: BackendResult<Vec<CameraDevice>>,
    /// When true, photo requests are answered immediately with a frame;
    /// when false, the request stays pending.
    auto_fulfill: bool,
    initialized: AtomicBool,
    current: Mutex<Option<CameraDevice>>,
    slot: PhotoRequestSlot,
}

impl MockBackend {
    fn new(devices: BackendResult<Vec<CameraDevice>>) -> Self {
        Self {
            devices,
            auto_fulfill: true,
            initialized: AtomicBool::new(false),
            current: Mutex::new(None),
            slot: Arc::new(Mutex::new(None)),
        }
    }

    fn pending(devices: BackendResult<Vec<CameraDevice>>) -> Self {
        Self {
            auto_fulfill: false,
            ..Self::new(devices)
        }
    }
}

impl CameraBackend for MockBackend {
    fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        self.devices.clone()
    }

    fn get_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        vec![CameraFormat {
            width: 640,
            height: 480,
            framerate: Some(30),
            pixel_format: "YUY2".to_string(),
        }]
    }

    fn initialize(
        &mut self,
        device: &CameraDevice,
        _format: Option<&CameraFormat>,
        _frames: FrameSender,
    ) -> BackendResult<()> {
        *self.current.lock().unwrap() = Some(device.clone());
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        self.initialized.store(false, Ordering::SeqCst);
        *self.current.lock().unwrap() = None;
        self.slot.lock().unwrap().take();
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn request_photo(&self) -> BackendResult<tokio::sync::oneshot::Receiver<CameraFrame>> {
        if !self.is_initialized() {
            return Err(BackendError::NotReady);
        }

        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return Err(BackendError::CaptureInProgress);
        }

        let (sender, receiver) = tokio::sync::oneshot::channel();
        if self.auto_fulfill {
            sender.send(test_frame()).ok();
        } else {
            *slot = Some(sender);
        }
        Ok(receiver)
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        // The session never calls this through the mock; presence checks go
        // through the selection instead.
        None
    }
}

fn test_frame() -> CameraFrame {
    CameraFrame {
        width: 2,
        height: 2,
        data: Arc::from(vec![0u8; 16].as_slice()),
        stride: 8,
        captured_at: Instant::now(),
    }
}

fn device(name: &str, facing: CameraFacing, flash: bool) -> CameraDevice {
    CameraDevice {
        name: name.to_string(),
        path: format!("pipewire-{}", name),
        node_id: None,
        device_info: None,
        facing,
        flash_available: flash,
    }
}

fn frame_channel() -> (FrameSender, FrameReceiver) {
    futures::channel::mpsc::channel(8)
}

#[test]
fn capture_on_unconfigured_session_is_rejected_not_a_crash() {
    let session =
        CaptureSession::with_backend(SessionPreset::Photo, Box::new(MockBackend::new(Ok(vec![]))));

    assert_eq!(session.capture_settings().unwrap_err(), BackendError::NotReady);
    assert_eq!(
        session.request_photo().map(|_| ()).unwrap_err(),
        BackendError::NotReady
    );
}

#[test]
fn zero_devices_leaves_active_absent_and_capture_rejected() {
    let session =
        CaptureSession::with_backend(SessionPreset::Photo, Box::new(MockBackend::new(Ok(vec![]))));

    let selection = session.discover().unwrap();
    assert!(selection.active().is_none());

    let (sender, _receiver) = frame_channel();
    assert_eq!(session.start(sender).unwrap_err(), BackendError::NotReady);
    assert_eq!(
        session.request_photo().map(|_| ()).unwrap_err(),
        BackendError::NotReady
    );
}

#[test]
fn back_and_front_discovered_yields_back_active_with_auto_flash() {
    let devices = vec![
        device("rear", CameraFacing::Back, true),
        device("selfie", CameraFacing::Front, false),
    ];
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::new(Ok(devices))),
    );

    let selection = session.discover().unwrap();
    assert_eq!(selection.active().map(|d| d.name.as_str()), Some("rear"));

    let (sender, _receiver) = frame_channel();
    session.start(sender).unwrap();
    assert!(session.is_running());

    let request = session.request_photo().unwrap();
    assert_eq!(request.settings.flash, FlashMode::Auto);
    assert!(request.settings.stabilization);

    let frame = request.blocking_frame(Duration::from_secs(1)).unwrap();
    assert_eq!((frame.width, frame.height), (2, 2));
}

#[test]
fn flash_is_off_when_device_reports_no_flash() {
    let devices = vec![device("rear", CameraFacing::Back, false)];
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::new(Ok(devices))),
    );

    session.discover().unwrap();
    let settings = session.capture_settings().unwrap();
    assert_eq!(settings.flash, FlashMode::Off);
    assert!(settings.stabilization);
}

#[test]
fn second_request_while_pending_is_rejected() {
    let devices = vec![device("rear", CameraFacing::Back, false)];
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::pending(Ok(devices))),
    );

    session.discover().unwrap();
    let (sender, _receiver) = frame_channel();
    session.start(sender).unwrap();

    let _pending = session.request_photo().unwrap();
    assert_eq!(
        session.request_photo().map(|_| ()).unwrap_err(),
        BackendError::CaptureInProgress
    );
}

#[test]
fn shutdown_drops_pending_request_with_structured_error() {
    let devices = vec![device("rear", CameraFacing::Back, false)];
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::pending(Ok(devices))),
    );

    session.discover().unwrap();
    let (sender, _receiver) = frame_channel();
    session.start(sender).unwrap();

    let request = session.request_photo().unwrap();
    session.shutdown().unwrap();
    assert!(!session.is_running());

    let err = request.blocking_frame(Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, BackendError::CaptureFailed(_)));
}

#[test]
fn discovery_propagates_permission_denied() {
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::new(Err(BackendError::PermissionDenied(
            "/dev/video0".to_string(),
        )))),
    );

    let err = session.discover().unwrap_err();
    assert!(matches!(err, BackendError::PermissionDenied(_)));
}

#[test]
fn discovery_propagates_device_not_found() {
    let session = CaptureSession::with_backend(
        SessionPreset::Photo,
        Box::new(MockBackend::new(Err(BackendError::DeviceNotFound(
            "no video capture nodes".to_string(),
        )))),
    );

    let err = session.discover().unwrap_err();
    assert!(matches!(err, BackendError::DeviceNotFound(_)));
}

#[test]
fn session_trait_object_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Box<dyn CameraBackend>>();
    assert_send_sync::<CaptureSession>();
}
