// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! Hardware access lives behind this layer so the app and the photo
//! pipeline never talk to PipeWire directly:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │            ┌──────────────────┐             │
//! │            │     Camera       │             │
//! │            │    (PipeWire)    │             │
//! │            └──────────────────┘             │
//! └─────────────────────────────────────────────┘
//! ```

pub mod camera;
