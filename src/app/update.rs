// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function dispatches to focused handler methods. The
//! capture flow is the interesting part: shutter → (optional flash lead) →
//! one-shot photo request → photo pipeline → saved path or error, with the
//! Idle/Requesting state machine rejecting overlapping requests.

use crate::app::state::{AppModel, CaptureState, DiscoveryState, Message};
use crate::backends::camera::types::BackendError;
use crate::config::Config;
use crate::constants::timing;
use crate::fl;
use crate::pipelines::photo::{EncodingQuality, PhotoPipeline};
use cosmic::Task;
use std::sync::Arc;
use tracing::{error, info, warn};

impl AppModel {
    /// Main message handler - routes messages to handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            Message::CamerasDiscovered(result) => self.handle_cameras_discovered(result),
            Message::SessionFailed(error) => self.handle_session_failed(error),
            Message::CameraFrame(frame) => self.handle_camera_frame(frame),
            Message::Capture => self.handle_capture(),
            Message::FlashComplete => self.handle_flash_complete(),
            Message::PhotoCaptured(result) => self.handle_photo_captured(result),
            Message::PhotoSaved(result) => self.handle_photo_saved(result),
            Message::UpdateConfig(config) => self.handle_update_config(config),
        }
    }

    fn handle_update_config(&mut self, config: Config) -> Task<cosmic::Action<Message>> {
        self.config = config;
        // Re-apply the theme in case the preference changed on disk.
        cosmic::command::set_theme(self.config.app_theme.theme())
    }

    /// Create a delayed task that sends a message after the given milliseconds
    pub(crate) fn delay_task(millis: u64, message: Message) -> Task<cosmic::Action<Message>> {
        Task::perform(
            async move {
                tokio::time::sleep(tokio::time::Duration::from_millis(millis)).await;
                message
            },
            cosmic::Action::App,
        )
    }

    fn handle_cameras_discovered(
        &mut self,
        result: Result<crate::backends::camera::CameraSelection, BackendError>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(selection) => match selection.active() {
                Some(device) => {
                    info!(device = %device.name, facing = %device.facing, "Active camera designated");
                    self.discovery = DiscoveryState::Ready;
                }
                None => {
                    warn!("Discovery finished without a back-facing camera");
                    self.discovery = DiscoveryState::Failed(BackendError::DeviceNotFound(
                        "no back-facing camera".to_string(),
                    ));
                }
            },
            Err(error) => {
                error!(%error, "Camera discovery failed");
                self.discovery = DiscoveryState::Failed(error);
            }
        }
        Task::none()
    }

    fn handle_session_failed(&mut self, error: BackendError) -> Task<cosmic::Action<Message>> {
        error!(%error, "Capture session failed to start");
        self.status = Some(error.to_string());
        Task::none()
    }

    fn handle_camera_frame(
        &mut self,
        frame: Arc<crate::backends::camera::types::CameraFrame>,
    ) -> Task<cosmic::Action<Message>> {
        self.preview_handle = Some(crate::app::camera_preview::frame_to_handle(&frame));
        self.current_frame = Some(frame);
        Task::none()
    }

    /// Shutter press: resolve capture settings, fire the flash when the
    /// settings say so, then submit the photo request.
    fn handle_capture(&mut self) -> Task<cosmic::Action<Message>> {
        if self.capture.is_requesting() || self.flash_active {
            warn!("Shutter pressed while a capture is pending");
            self.status = Some(fl!("capture-busy"));
            return Task::none();
        }

        let settings = match self.session.capture_settings() {
            Ok(settings) => settings,
            Err(error) => {
                warn!(%error, "Shutter pressed without a ready session");
                self.status = Some(error.to_string());
                return Task::none();
            }
        };

        info!(
            flash = %settings.flash,
            stabilization = settings.stabilization,
            "Capturing photo"
        );

        if settings.flash.fires() && !self.flash_devices.is_empty() {
            // Light the LEDs first and give them a moment before the frame
            // is taken; the request is submitted on FlashComplete.
            crate::flash::all_on(&self.flash_devices);
            self.flash_active = true;
            return Self::delay_task(timing::FLASH_LEAD_MS, Message::FlashComplete);
        }

        self.submit_photo_request()
    }

    fn handle_flash_complete(&mut self) -> Task<cosmic::Action<Message>> {
        self.submit_photo_request()
    }

    /// Submit the one-shot photo request and await its frame.
    fn submit_photo_request(&mut self) -> Task<cosmic::Action<Message>> {
        match self.session.request_photo() {
            Ok(request) => {
                self.capture = CaptureState::begin();
                Task::perform(
                    async move {
                        let result = request.into_frame(timing::CAPTURE_TIMEOUT).await;
                        Message::PhotoCaptured(result.map(Arc::new))
                    },
                    cosmic::Action::App,
                )
            }
            Err(error) => {
                error!(%error, "Photo request rejected");
                self.extinguish_flash();
                self.status = Some(error.to_string());
                Task::none()
            }
        }
    }

    /// The photo output delivered its result; hand a frame to the photo
    /// pipeline or surface the error.
    fn handle_photo_captured(
        &mut self,
        result: Result<Arc<crate::backends::camera::types::CameraFrame>, BackendError>,
    ) -> Task<cosmic::Action<Message>> {
        self.extinguish_flash();
        self.capture.finish();

        let frame = match result {
            Ok(frame) => frame,
            Err(error) => {
                error!(%error, "Photo capture failed");
                self.status = Some(format!("{}: {}", fl!("capture-failed"), error));
                return Task::none();
            }
        };

        let output_dir = crate::storage::photo_directory(self.config.photo_directory.as_deref());
        let pipeline = PhotoPipeline::new(EncodingQuality::High);

        Task::perform(
            async move {
                let result = pipeline
                    .capture_and_save(frame, output_dir)
                    .await
                    .map(|path| path.display().to_string())
                    .map_err(|e| e.to_string());
                Message::PhotoSaved(result)
            },
            cosmic::Action::App,
        )
    }

    fn handle_photo_saved(
        &mut self,
        result: Result<String, String>,
    ) -> Task<cosmic::Action<Message>> {
        match result {
            Ok(path) => {
                info!(path = %path, "Photo saved");
                self.status = Some(format!("{}: {}", fl!("photo-saved"), path));
            }
            Err(error) => {
                error!(error = %error, "Failed to save photo");
                self.status = Some(format!("{}: {}", fl!("capture-failed"), error));
            }
        }
        Task::none()
    }

    /// Turn the flash off again after a capture attempt, lit or not.
    fn extinguish_flash(&mut self) {
        if self.flash_active {
            crate::flash::all_off(&self.flash_devices);
            self.flash_active = false;
        }
    }
}
