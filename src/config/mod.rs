//! Configuration management for hotspot-dash.

mod addresses;
mod settings;

pub use addresses::{load_address_file, resolve_addresses};
pub use settings::{
    ApiConfig, Config, FailurePolicy, LoggingConfig, MetadataCadence, PollingConfig,
};

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the configuration directory path.
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("io", "hotspot-dash", "hotspot-dash")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::config("Could not determine config directory"))
}

/// Get the log directory path.
pub fn log_dir() -> Result<PathBuf> {
    ProjectDirs::from("io", "hotspot-dash", "hotspot-dash")
        .map(|dirs| dirs.data_dir().join("logs"))
        .ok_or_else(|| Error::config("Could not determine log directory"))
}
