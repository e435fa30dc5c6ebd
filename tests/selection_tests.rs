// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for camera classification

use viewfinder::backends::camera::CameraSelection;
use viewfinder::backends::camera::types::{CameraDevice, CameraFacing};

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
fn classification_keeps_one_candidate_per_facing() {
    let devices = vec![
        device("rear", CameraFacing::Back),
        device("selfie", CameraFacing::Front),
        device("hdmi-grabber", CameraFacing::External),
    ];

    let selection = CameraSelection::classify(&devices);

    assert_eq!(selection.back().map(|d| d.name.as_str()), Some("rear"));
    assert_eq!(selection.front().map(|d| d.name.as_str()), Some("selfie"));
}

#[test]
fn default_active_device_is_the_back_camera() {
    let devices = vec![
        device("selfie", CameraFacing::Front),
        device("rear", CameraFacing::Back),
    ];

    let selection = CameraSelection::classify(&devices);
    assert_eq!(selection.active().map(|d| d.name.as_str()), Some("rear"));
}

#[test]
fn no_back_camera_means_no_active_device() {
    // No fallback to the front camera is attempted.
    let selection = CameraSelection::classify(&[device("selfie", CameraFacing::Front)]);
    assert!(selection.active().is_none());
}

#[test]
fn empty_discovery_is_not_an_error() {
    let selection = CameraSelection::classify(&[]);
    assert!(selection.is_empty());
    assert!(selection.active().is_none());
    assert!(selection.front().is_none());
}
