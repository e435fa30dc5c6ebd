// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines for photo capture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG File   │
//! │   (RGBA)     │     │  - RGBA→RGB       │     │              │
//! │              │     │  - Encoding       │     │              │
//! │              │     │  - Disk I/O       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! The pipeline runs in background tasks so the live preview never pauses
//! while a photo is being encoded and written.

pub mod photo;
