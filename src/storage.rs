// SPDX-License-Identifier: GPL-3.0-only

//! Storage utilities for the photo library
//!
//! Captured photos land in a `viewfinder` subdirectory of the user's XDG
//! pictures directory, with timestamped filenames. The configuration may
//! override the base directory.

use chrono::Local;
use std::path::PathBuf;
use tracing::info;

/// Subdirectory of the pictures directory that photos are written to
const PHOTO_SUBDIR: &str = "viewfinder";

/// Resolve the photo directory.
///
/// An explicit override wins; otherwise the XDG pictures directory (or
/// `~/Pictures` when XDG is not configured) gets a `viewfinder` subfolder.
pub fn photo_directory(override_dir: Option<&str>) -> PathBuf {
    if let Some(dir) = override_dir {
        return PathBuf::from(dir);
    }

    let pictures = dirs::picture_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join("Pictures")
    });

    pictures.join(PHOTO_SUBDIR)
}

/// Ensure the photo directory exists, creating it if necessary
pub fn ensure_photo_directory(override_dir: Option<&str>) -> std::io::Result<PathBuf> {
    let photo_dir = photo_directory(override_dir);
    std::fs::create_dir_all(&photo_dir)?;
    info!(path = %photo_dir.display(), "Photo directory ready");
    Ok(photo_dir)
}

/// Build a timestamped photo path, e.g. `photo_20250114_153012.jpg`
pub fn timestamped_photo_path(dir: &std::path::Path, extension: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("photo_{}.{}", timestamp, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_directory_wins() {
        let dir = photo_directory(Some("/tmp/photos"));
        assert_eq!(dir, PathBuf::from("/tmp/photos"));
    }

    #[test]
    fn default_directory_ends_with_app_subdir() {
        let dir = photo_directory(None);
        assert_eq!(
            dir.file_name().and_then(|n| n.to_str()),
            Some(PHOTO_SUBDIR)
        );
    }

    #[test]
    fn photo_paths_carry_prefix_and_extension() {
        let path = timestamped_photo_path(std::path::Path::new("/tmp"), "jpg");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("photo_"));
        assert!(name.ends_with(".jpg"));
    }
}
