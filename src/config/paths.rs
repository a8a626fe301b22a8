//! Configuration file path resolution

use directories::ProjectDirs;
use std::path::PathBuf;

/// Path to the root configuration file
///
/// Resolves to the platform config directory (e.g.
/// `~/.config/driftwatch/config.yaml` on Linux), falling back to the current
/// directory when no home directory is available.
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Platform configuration directory for driftwatch
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", "driftwatch")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
