// SPDX-License-Identifier: GPL-3.0-only

//! PipeWire camera enumeration and format detection
//!
//! Camera discovery parses `pw-cli ls Node` output for `Video/Source` nodes.
//! Facing comes from the `api.libcamera.location` node property when the
//! device is driven by libcamera; plain V4L2 webcams fall back to a name
//! heuristic. When discovery comes back empty, `/dev/video*` is probed to
//! tell "no camera present" apart from "camera present but not accessible".

use super::types::{
    BackendError, BackendResult, CameraDevice, CameraFacing, CameraFormat, DeviceInfo,
};
use crate::flash::FlashDevice;
use tracing::{debug, info, warn};

/// Enumerate cameras available through PipeWire.
///
/// Returns `DeviceNotFound` when the system has no video capture nodes and
/// `PermissionDenied` when device nodes exist but cannot be opened.
pub fn enumerate_cameras() -> BackendResult<Vec<CameraDevice>> {
    debug!("Enumerating cameras via PipeWire");

    gstreamer::init()
        .map_err(|e| BackendError::NotAvailable(format!("GStreamer init failed: {}", e)))?;

    if gstreamer::ElementFactory::find("pipewiresrc").is_none() {
        return Err(BackendError::NotAvailable(
            "pipewiresrc element not found".to_string(),
        ));
    }

    let cameras = try_enumerate_with_pw_cli().unwrap_or_default();

    if cameras.is_empty() {
        return Err(probe_video_nodes());
    }

    info!(count = cameras.len(), "Found camera(s) via pw-cli");
    Ok(cameras)
}

/// Decide why discovery came back empty by inspecting `/dev/video*` directly.
///
/// Device nodes that exist but cannot be opened mean the camera is present
/// and access is the problem; nothing under `/dev` means no camera at all.
fn probe_video_nodes() -> BackendError {
    let Ok(entries) = std::fs::read_dir("/dev") else {
        return BackendError::DeviceNotFound("no video capture nodes".to_string());
    };

    let mut denied: Option<String> = None;
    let mut present = false;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name_str) = name.to_str() else {
            continue;
        };
        if !name_str.starts_with("video") {
            continue;
        }

        present = true;
        let path = entry.path();
        match std::fs::File::open(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                warn!(path = %path.display(), "Video device exists but is not readable");
                denied = Some(path.display().to_string());
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Video device probe failed");
            }
        }
    }

    match (present, denied) {
        (_, Some(path)) => BackendError::PermissionDenied(path),
        (true, None) => {
            // Nodes exist and open fine, but PipeWire does not expose them.
            BackendError::DeviceNotFound("video devices present but not exported by PipeWire".to_string())
        }
        (false, None) => BackendError::DeviceNotFound("no video capture nodes".to_string()),
    }
}

/// Try to enumerate cameras using the pw-cli command
fn try_enumerate_with_pw_cli() -> Option<Vec<CameraDevice>> {
    debug!("Trying pw-cli for camera enumeration");

    let output = std::process::Command::new("pw-cli")
        .args(["ls", "Node"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli command failed");
        return None;
    }

    // Flash LEDs sit next to the world-facing camera on devices that have
    // one; front and external cameras never get the flash.
    let flash_present = !FlashDevice::discover().is_empty();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut cameras = Vec::new();
    let mut node = NodeProperties::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Node boundary (format: "id 76, type PipeWire:Interface:Node/3")
        if trimmed.starts_with("id ") && trimmed.contains("type PipeWire:Interface:Node") {
            if let Some(camera) = node.into_camera(flash_present) {
                cameras.push(camera);
            }
            node = NodeProperties::default();

            if let Some(id_str) = trimmed.strip_prefix("id ")
                && let Some(id_num) = id_str.split(',').next()
            {
                node.id = Some(id_num.trim().trim_end_matches(',').to_string());
            }
        }

        if trimmed.contains("media.class") && trimmed.contains("\"Video/Source\"") {
            node.is_video_source = true;
        }

        if trimmed.contains("object.serial")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            node.serial = Some(value);
        }

        if trimmed.contains("object.path")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            node.object_path = Some(value);
        }

        if trimmed.contains("node.nick")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            node.nick = Some(value);
        }

        if trimmed.contains("node.description")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            node.description = Some(value);
        }
    }

    // Don't forget the last node
    if let Some(camera) = node.into_camera(flash_present) {
        cameras.push(camera);
    }

    if cameras.is_empty() {
        debug!("No cameras found via pw-cli");
        None
    } else {
        debug!(count = cameras.len(), "Enumerated cameras via pw-cli");
        Some(cameras)
    }
}

/// Properties collected for one PipeWire node while parsing `pw-cli ls`.
#[derive(Debug, Default)]
struct NodeProperties {
    id: Option<String>,
    serial: Option<String>,
    description: Option<String>,
    nick: Option<String>,
    object_path: Option<String>,
    is_video_source: bool,
}

impl NodeProperties {
    /// Turn the collected properties into a camera device, if this node was
    /// a video source with enough metadata.
    fn into_camera(self, flash_present: bool) -> Option<CameraDevice> {
        if !self.is_video_source {
            return None;
        }

        let id = self.id?;
        let name = self.description?;

        // Priority: use object.serial for target-object, fallback to node ID
        let path = if let Some(serial) = self.serial.as_ref() {
            format!("pipewire-serial-{}", serial)
        } else {
            format!("pipewire-{}", id)
        };

        let device_info = build_device_info(self.nick.as_deref(), self.object_path.as_deref());
        let facing = query_node_facing(&id).unwrap_or_else(|| facing_from_name(&name));
        let flash_available = flash_present && facing == CameraFacing::Back;

        debug!(
            id = %id,
            name = %name,
            path = %path,
            facing = %facing,
            flash_available,
            "Found video camera"
        );

        Some(CameraDevice {
            name,
            path,
            node_id: Some(id),
            device_info,
            facing,
            flash_available,
        })
    }
}

/// Extract quoted value from a property line (e.g., 'property = "value"' -> "value")
fn extract_quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let end = line[start + 1..].find('"')?;
    Some(line[start + 1..start + 1 + end].to_string())
}

/// Query facing for a PipeWire node using pw-cli info.
///
/// The location property is not included in `pw-cli ls Node` output, so each
/// candidate node gets a follow-up `pw-cli info` query.
fn query_node_facing(node_id: &str) -> Option<CameraFacing> {
    let output = match std::process::Command::new("pw-cli")
        .args(["info", node_id])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => {
            debug!(node_id, "Failed to query node info for location");
            return None;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);

    for line in stdout.lines() {
        let trimmed = line.trim();
        // Look for: api.libcamera.location = "back"
        if trimmed.contains("api.libcamera.location")
            && let Some(value) = extract_quoted_value(trimmed)
        {
            debug!(node_id, location = %value, "Found location from pw-cli info");
            return CameraFacing::from_location(&value);
        }
    }

    None
}

/// Guess facing from the device name when no location property exists.
///
/// Webcams without a location act as the main (back) camera so that a
/// laptop's only camera is usable; names mentioning "front" win the front
/// classification.
fn facing_from_name(name: &str) -> CameraFacing {
    let lowered = name.to_ascii_lowercase();
    if lowered.contains("front") || lowered.contains("user-facing") {
        CameraFacing::Front
    } else {
        CameraFacing::Back
    }
}

/// Build DeviceInfo from PipeWire properties
fn build_device_info(nick: Option<&str>, object_path: Option<&str>) -> Option<DeviceInfo> {
    // Extract V4L2 device path from object.path (format: "v4l2:/dev/video0")
    let v4l2_path = object_path.and_then(|p| p.strip_prefix("v4l2:"))?.to_string();

    let real_path = std::fs::canonicalize(&v4l2_path)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| v4l2_path.clone());

    Some(DeviceInfo {
        card: nick.unwrap_or_default().to_string(),
        path: v4l2_path,
        real_path,
    })
}

/// Get supported formats for a camera via `pw-cli enum-params`.
///
/// Returns an empty list when the query fails; callers treat that as
/// "let PipeWire negotiate".
pub fn get_formats(device: &CameraDevice) -> Vec<CameraFormat> {
    let Some(node_id) = device.node_id.as_deref() else {
        debug!(name = %device.name, "No node ID for format enumeration");
        return Vec::new();
    };

    let formats = try_enumerate_formats_from_node(node_id).unwrap_or_default();
    debug!(
        node_id,
        count = formats.len(),
        "Format enumeration complete"
    );
    formats
}

/// Try to enumerate formats from a PipeWire node using pw-cli
fn try_enumerate_formats_from_node(node_id: &str) -> Option<Vec<CameraFormat>> {
    let output = std::process::Command::new("pw-cli")
        .args(["enum-params", node_id, "EnumFormat"])
        .output()
        .ok()?;

    if !output.status.success() {
        debug!("pw-cli enum-params failed");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut formats = Vec::new();
    let mut group = FormatGroup::default();

    for line in stdout.lines() {
        let trimmed = line.trim();

        // Media subtype, e.g. "Id 1   (Spa:Enum:MediaSubtype:raw)"
        if trimmed.contains("Spa:Enum:MediaSubtype:")
            && let Some(subtype_start) = trimmed.rfind(':')
        {
            let subtype = trimmed[subtype_start + 1..].trim_end_matches(')');
            group.subtype = Some(subtype.to_lowercase());
        }

        // Raw video format, e.g. "Id 4   (Spa:Enum:VideoFormat:YUY2)"
        if trimmed.contains("Spa:Enum:VideoFormat:")
            && let Some(format_start) = trimmed.rfind(':')
        {
            let video_format = trimmed[format_start + 1..].trim_end_matches(')');
            group.video_format = Some(video_format.to_uppercase());
        }

        // Resolution, e.g. "Rectangle 1920x1080"
        if trimmed.starts_with("Rectangle ")
            && let Some(res_str) = trimmed.strip_prefix("Rectangle ")
            && let Some((w_str, h_str)) = res_str.split_once('x')
        {
            group.width = w_str.parse().ok();
            group.height = h_str.parse().ok();
        }

        // Framerate, e.g. "Fraction 60/1" or "Fraction 60000/1001"
        if trimmed.starts_with("Fraction ")
            && let Some(frac_str) = trimmed.strip_prefix("Fraction ")
            && let Some((num_str, denom_str)) = frac_str.split_once('/')
            && let (Ok(num), Ok(denom)) = (num_str.parse::<u32>(), denom_str.parse::<u32>())
            && denom > 0
        {
            let fps = num / denom;
            if !group.framerates.contains(&fps) {
                group.framerates.push(fps);
            }
        }

        // A new Object closes the previous format group
        if trimmed.starts_with("Object:") {
            group.flush_into(&mut formats);
        }
    }

    // Don't forget the last format group
    group.flush_into(&mut formats);

    if formats.is_empty() { None } else { Some(formats) }
}

/// Format properties accumulated per EnumFormat object.
#[derive(Debug, Default)]
struct FormatGroup {
    width: Option<u32>,
    height: Option<u32>,
    framerates: Vec<u32>,
    subtype: Option<String>,
    video_format: Option<String>,
}

impl FormatGroup {
    fn flush_into(&mut self, formats: &mut Vec<CameraFormat>) {
        if let (Some(w), Some(h), Some(subtype)) = (self.width, self.height, self.subtype.as_ref())
        {
            // Raw formats report their VideoFormat; compressed formats are
            // named by the subtype itself (MJPG, H264).
            let pixel_format = if subtype == "raw" {
                self.video_format
                    .clone()
                    .unwrap_or_else(|| "YUY2".to_string())
            } else {
                subtype.to_uppercase()
            };

            if self.framerates.is_empty() {
                // libcamera devices expose no framerates via EnumFormat;
                // the rate is negotiated per resolution.
                formats.push(CameraFormat {
                    width: w,
                    height: h,
                    framerate: None,
                    pixel_format,
                });
            } else {
                for fps in &self.framerates {
                    formats.push(CameraFormat {
                        width: w,
                        height: h,
                        framerate: Some(*fps),
                        pixel_format: pixel_format.clone(),
                    });
                }
            }
        }

        *self = FormatGroup::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_property_values() {
        assert_eq!(
            extract_quoted_value("node.description = \"Integrated Camera\""),
            Some("Integrated Camera".to_string())
        );
        assert_eq!(extract_quoted_value("no quotes here"), None);
    }

    #[test]
    fn name_heuristic_defaults_to_back() {
        assert_eq!(facing_from_name("Integrated Camera"), CameraFacing::Back);
        assert_eq!(facing_from_name("USB 2.0 Camera"), CameraFacing::Back);
    }

    #[test]
    fn name_heuristic_detects_front_cameras() {
        assert_eq!(facing_from_name("Front camera"), CameraFacing::Front);
        assert_eq!(
            facing_from_name("OV5640 front sensor"),
            CameraFacing::Front
        );
    }

    #[test]
    fn device_info_requires_v4l2_object_path() {
        assert!(build_device_info(Some("Webcam"), None).is_none());
        let info = build_device_info(Some("Webcam"), Some("v4l2:/dev/video0")).unwrap();
        assert_eq!(info.card, "Webcam");
        assert_eq!(info.path, "/dev/video0");
    }
}
