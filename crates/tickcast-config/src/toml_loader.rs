//! TOML config file loading.

use std::path::{Path, PathBuf};

use tickcast_common::ConfigError;
use tracing::{debug, info};

use crate::schema::TickcastConfig;
use crate::validation;

/// Load and validate config from a specific TOML file path.
///
/// Missing fields take their defaults. A file that fails validation is an
/// error, not a fallback to defaults.
pub fn load_from_path(path: &Path) -> Result<TickcastConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: TickcastConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    validation::validate(&config)?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from `explicit` if given, else from the platform default
/// path if a file exists there, else return defaults.
///
/// An explicitly named file that does not exist is an error.
pub fn load_or_default(explicit: Option<&Path>) -> Result<TickcastConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => load_from_path(&path),
        Some(path) => {
            debug!("no config at {}, using defaults", path.display());
            Ok(TickcastConfig::default())
        }
        None => Ok(TickcastConfig::default()),
    }
}

/// Platform-specific default config file path.
///
/// On Linux: `~/.config/tickcast/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tickcast").join("config.toml"))
}
