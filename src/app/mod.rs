// SPDX-License-Identifier: GPL-3.0-only

//! Main application module
//!
//! - `state`: Application state types (AppModel, Message, CaptureState)
//! - `camera_preview`: Camera preview display widget
//! - `controls`: Shutter button
//! - `view`: Main view rendering
//! - `update`: Message handling

pub mod camera_preview;
mod controls;
mod state;
mod update;
mod view;

use crate::backends::camera::{CaptureSession, SessionPreset};
use crate::config::Config;
use crate::constants::pipeline;
use cosmic::cosmic_config::{self, CosmicConfigEntry};
use cosmic::iced::Subscription;
use cosmic::{Element, Task};
pub use state::{AppModel, CaptureState, DiscoveryState, Message};
use tracing::{error, info, warn};

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = "io.github.cosmic-utils.viewfinder";

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        // Load configuration
        let (config_handler, config) =
            match cosmic_config::Config::new(Self::APP_ID, Config::VERSION) {
                Ok(handler) => {
                    let config = match Config::get_entry(&handler) {
                        Ok(config) => config,
                        Err((errors, config)) => {
                            error!(?errors, "Errors loading config");
                            config
                        }
                    };
                    (Some(handler), config)
                }
                Err(err) => {
                    error!(%err, "Failed to create config handler");
                    (None, Config::default())
                }
            };

        // Ensure the photo directory exists
        if let Err(e) =
            crate::storage::ensure_photo_directory(config.photo_directory.as_deref())
        {
            error!(error = %e, "Failed to create photo directory");
        }

        // Initialize GStreamer early (required before any pipeline work)
        if let Err(e) = gstreamer::init() {
            error!(error = %e, "Failed to initialize GStreamer");
        }

        // Flash LEDs are fixed hardware; one scan at startup is enough.
        let flash_devices = crate::flash::FlashDevice::discover();

        let session = CaptureSession::new(SessionPreset::Photo);

        let app = AppModel {
            core,
            config,
            config_handler,
            session: session.clone(),
            discovery: DiscoveryState::Pending,
            capture: CaptureState::Idle,
            current_frame: None,
            preview_handle: None,
            flash_devices,
            flash_active: false,
            status: None,
        };

        // Apply the configured theme before the first frame is drawn.
        let theme_task = cosmic::command::set_theme(app.config.app_theme.theme());

        // Discovery shells out to pw-cli; run it off the UI path.
        let discover_task = Task::perform(
            async move {
                info!("Enumerating cameras asynchronously");
                let result = session.discover();
                Message::CamerasDiscovered(result)
            },
            cosmic::Action::App,
        );

        (app, Task::batch([theme_task, discover_task]))
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        use futures::{SinkExt, StreamExt};

        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        // The camera subscription owns the session's running pipeline: it
        // starts the session when discovery is ready and shuts it down when
        // the stream is dropped. The id flips when discovery completes,
        // restarting the subscription with a usable device.
        let session = self.session.clone();
        let session_ready = self.discovery.is_ready();

        let camera_sub = Subscription::run_with_id(
            ("camera", session_ready),
            cosmic::iced::stream::channel(
                pipeline::FRAME_CHANNEL_CAPACITY,
                move |mut output| async move {
                    if !session_ready {
                        info!("Camera subscription idle until discovery completes");
                        return;
                    }

                    let (sender, mut receiver) =
                        futures::channel::mpsc::channel(pipeline::FRAME_CHANNEL_CAPACITY);

                    if let Err(error) = session.start(sender) {
                        error!(%error, "Failed to start capture session");
                        let _ = output.send(Message::SessionFailed(error)).await;
                        return;
                    }

                    info!("Camera subscription started");

                    loop {
                        if output.is_closed() {
                            info!("Output channel closed - camera subscription ending");
                            break;
                        }

                        // Poll with a timeout so a stalled pipeline still
                        // lets us notice subscription teardown.
                        match tokio::time::timeout(
                            tokio::time::Duration::from_millis(16),
                            receiver.next(),
                        )
                        .await
                        {
                            Ok(Some(frame)) => {
                                match output.try_send(Message::CameraFrame(std::sync::Arc::new(frame))) {
                                    Ok(_) => {}
                                    Err(e) => {
                                        if e.is_disconnected() {
                                            info!("Output channel disconnected - camera subscription ending");
                                            break;
                                        }
                                        // Dropping frames is fine for live
                                        // preview; the next one supersedes.
                                    }
                                }
                            }
                            Ok(None) => {
                                warn!("Camera frame stream ended");
                                break;
                            }
                            Err(_) => continue,
                        }
                    }

                    if let Err(error) = session.shutdown() {
                        warn!(%error, "Session shutdown reported an error");
                    }
                },
            ),
        );

        Subscription::batch([config_sub, camera_sub])
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
