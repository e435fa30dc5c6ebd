// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Capture pipeline tuning
pub mod pipeline {
    /// Appsink buffer queue depth; anything older is dropped
    pub const MAX_BUFFERS: u32 = 2;

    /// Attempts when launching a pipeline (PipeWire node release races)
    pub const CREATE_RETRIES: u32 = 3;

    /// Delay between pipeline launch attempts in milliseconds
    pub const RETRY_DELAY_MS: u64 = 500;

    /// Capacity of the preview frame channel
    pub const FRAME_CHANNEL_CAPACITY: usize = 100;
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// How long to wait for the pipeline to reach PLAYING
    pub const PIPELINE_START_TIMEOUT_SECS: u64 = 5;

    /// How long to wait for the pipeline to reach NULL on shutdown
    pub const PIPELINE_STOP_TIMEOUT_SECS: u64 = 2;

    /// Log one frame diagnostic line every this many frames
    pub const FRAME_LOG_INTERVAL: u64 = 60;

    /// How long a photo request may wait for its frame
    pub const CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Camera warm-up before a headless capture uses a frame
    pub const CAPTURE_WARMUP: Duration = Duration::from_millis(500);

    /// How long the flash LED leads the captured frame, in milliseconds
    pub const FLASH_LEAD_MS: u64 = 150;
}

/// Shutter button geometry
pub mod ui {
    /// Inner circle diameter in logical pixels
    pub const CAPTURE_BUTTON_INNER: f32 = 56.0;

    /// Outer ring diameter in logical pixels
    pub const CAPTURE_BUTTON_OUTER: f32 = 72.0;

    /// Inner circle corner radius (half the diameter)
    pub const CAPTURE_BUTTON_RADIUS: f32 = CAPTURE_BUTTON_INNER / 2.0;
}
