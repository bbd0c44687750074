//! Well-known costlens locations under `~/.costlens/`.

use std::path::PathBuf;

use crate::error::{CostlensError, Result};

/// Get the costlens data directory.
///
/// Returns `~/.costlens/`
pub fn costlens_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").map_err(|_| CostlensError::HomeNotSet)?;
    Ok(PathBuf::from(home).join(".costlens"))
}

/// Get the default log directory path.
///
/// Returns `~/.costlens/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(costlens_dir()?.join("logs"))
}

/// Get the default configuration file path.
///
/// Returns `~/.costlens/config.yaml`
pub fn default_config_file() -> Result<PathBuf> {
    Ok(costlens_dir()?.join("config.yaml"))
}
