// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the configuration module

use viewfinder::Config;
use viewfinder::config::AppTheme;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(
        config.app_theme,
        AppTheme::System,
        "Theme should follow the system by default"
    );
    assert!(
        config.photo_directory.is_none(),
        "Photos should go to the XDG pictures directory by default"
    );
}
