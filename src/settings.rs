//! Application settings - loaded once at startup, read-only afterwards
//!
//! Settings come from a `settings.toml` in the working directory, or
//! failing that from `~/.manifestor/settings.toml`. The loaded value is
//! passed explicitly to each collaborator at construction; nothing in
//! the crate reads configuration ambiently.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::constants::{SETTINGS_FILE_NAME, USER_CONFIG_DIR};

/// Errors raised while loading the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Process-wide configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// URL scheme for the shipment API, e.g. "https"
    pub protocol: String,
    /// Host name of the shipment API
    pub domain: String,
    /// API auth token, sent with every request
    pub token: String,
    /// Directory holding the local shipping files
    pub shipment_directory: PathBuf,
    /// File name of the commodities CSV within the shipment directory
    pub commodities_file_name: String,
    /// File name of the address CSV within the shipment directory
    pub address_file_name: String,
    /// Maximum drawing area width in terminal cells
    #[serde(default = "default_window_width")]
    pub window_width: u16,
    /// Maximum drawing area height in terminal cells
    #[serde(default = "default_window_height")]
    pub window_height: u16,
    /// Accent color theme name
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_window_width() -> u16 {
    120
}

fn default_window_height() -> u16 {
    40
}

fn default_theme() -> String {
    String::from("cyan")
}

impl Settings {
    /// Load settings from the given file path
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            toml::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default locations
    ///
    /// Tries `./settings.toml` first, then `~/.manifestor/settings.toml`.
    pub fn load() -> Result<Self, SettingsError> {
        let local = PathBuf::from(SETTINGS_FILE_NAME);
        if local.is_file() {
            return Self::load_from(&local);
        }
        let fallback = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(USER_CONFIG_DIR)
            .join(SETTINGS_FILE_NAME);
        Self::load_from(&fallback)
    }

    /// Base URL for API requests, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }

    /// Path of the local commodities file
    pub fn commodities_file_path(&self) -> PathBuf {
        self.shipment_directory.join(&self.commodities_file_name)
    }

    /// Path of the local address file
    pub fn address_file_path(&self) -> PathBuf {
        self.shipment_directory.join(&self.address_file_name)
    }
}
