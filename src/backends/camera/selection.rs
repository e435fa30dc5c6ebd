// SPDX-License-Identifier: GPL-3.0-only

//! Front/back camera classification
//!
//! Discovery returns an unordered device list; this module reduces it to at
//! most one back-facing and one front-facing candidate and designates the
//! back camera as the active device. When no back camera exists the active
//! device is absent; there is deliberately no fallback to the front camera.

use super::types::{CameraDevice, CameraFacing};
use tracing::{debug, info};

/// The result of classifying discovered cameras by facing.
#[derive(Debug, Clone, Default)]
pub struct CameraSelection {
    back: Option<CameraDevice>,
    front: Option<CameraDevice>,
}

impl CameraSelection {
    /// Classify a discovery result.
    ///
    /// A later device with the same facing replaces an earlier one, so at
    /// most one candidate per facing survives. External cameras are not
    /// retained; they are neither a back nor a front candidate.
    pub fn classify(devices: &[CameraDevice]) -> Self {
        let mut selection = CameraSelection::default();

        for device in devices {
            match device.facing {
                CameraFacing::Back => {
                    debug!(name = %device.name, "Classified back camera");
                    selection.back = Some(device.clone());
                }
                CameraFacing::Front => {
                    debug!(name = %device.name, "Classified front camera");
                    selection.front = Some(device.clone());
                }
                CameraFacing::External => {
                    debug!(name = %device.name, "Ignoring external camera");
                }
            }
        }

        info!(
            back = selection.back.as_ref().map(|d| d.name.as_str()),
            front = selection.front.as_ref().map(|d| d.name.as_str()),
            "Camera classification complete"
        );

        selection
    }

    /// The back-facing candidate, if any.
    pub fn back(&self) -> Option<&CameraDevice> {
        self.back.as_ref()
    }

    /// The front-facing candidate, if any.
    pub fn front(&self) -> Option<&CameraDevice> {
        self.front.as_ref()
    }

    /// The active device: the back camera when one exists, otherwise absent.
    pub fn active(&self) -> Option<&CameraDevice> {
        self.back.as_ref()
    }

    /// Whether any candidate survived classification.
    pub fn is_empty(&self) -> bool {
        self.back.is_none() && self.front.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str, facing: CameraFacing) -> CameraDevice {
        CameraDevice {
            name: name.to_string(),
            path: format!("pipewire-{}", name),
            node_id: None,
            device_info: None,
            facing,
            flash_available: false,
        }
    }

    #[test]
    fn retains_at_most_one_per_facing() {
        let devices = vec![
            device("rear", CameraFacing::Back),
            device("selfie", CameraFacing::Front),
        ];
        let selection = CameraSelection::classify(&devices);

        assert_eq!(selection.back().map(|d| d.name.as_str()), Some("rear"));
        assert_eq!(selection.front().map(|d| d.name.as_str()), Some("selfie"));
    }

    #[test]
    fn active_is_back_when_present() {
        let devices = vec![
            device("selfie", CameraFacing::Front),
            device("rear", CameraFacing::Back),
        ];
        let selection = CameraSelection::classify(&devices);

        assert_eq!(selection.active().map(|d| d.name.as_str()), Some("rear"));
    }

    #[test]
    fn active_is_absent_without_back_camera() {
        let devices = vec![device("selfie", CameraFacing::Front)];
        let selection = CameraSelection::classify(&devices);

        // No fallback to the front camera.
        assert!(selection.active().is_none());
        assert!(selection.front().is_some());
    }

    #[test]
    fn empty_discovery_yields_empty_selection() {
        let selection = CameraSelection::classify(&[]);
        assert!(selection.is_empty());
        assert!(selection.active().is_none());
    }

    #[test]
    fn later_device_replaces_earlier_with_same_facing() {
        let devices = vec![
            device("rear-a", CameraFacing::Back),
            device("rear-b", CameraFacing::Back),
        ];
        let selection = CameraSelection::classify(&devices);

        assert_eq!(selection.back().map(|d| d.name.as_str()), Some("rear-b"));
    }

    #[test]
    fn external_cameras_are_not_candidates() {
        let devices = vec![device("capture-card", CameraFacing::External)];
        let selection = CameraSelection::classify(&devices);

        assert!(selection.is_empty());
    }
}
