// TOML config adapter - Settings files

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SettingsLayer;
use crate::domain::errors::ConfigError;

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "vidtask.toml";

/// Loads settings layers from TOML files
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Load the explicit file, or the default file if present.
    ///
    /// A missing explicit file is an error; a missing default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Option<SettingsLayer>, ConfigError> {
        match explicit {
            Some(path) => Self::load_file(path).map(Some),
            None => {
                let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if default.is_file() {
                    Self::load_file(&default).map(Some)
                } else {
                    debug!("No settings file found, using defaults");
                    Ok(None)
                }
            }
        }
    }

    /// Read and parse one settings file
    pub fn load_file(path: &Path) -> Result<SettingsLayer, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidSetting {
            key: "settings".to_string(),
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        let layer = Self::parse(&content).map_err(|e| ConfigError::InvalidSetting {
            key: "settings".to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(layer)
    }

    /// Parse settings TOML text
    pub fn parse(content: &str) -> Result<SettingsLayer, toml::de::Error> {
        toml::from_str(content)
    }
}
