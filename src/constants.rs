//! Application constants
//!
//! Centralized location for API paths and other magic strings.

/// Relative API path for listing currently open shipments
pub const CURRENT_SHIPMENTS_PATH: &str = "fba/api/current_shipments";

/// Relative API path for listing recent shipment exports
pub const SHIPMENT_EXPORTS_PATH: &str = "fba/api/shipment_exports";

/// Relative API path for closing open shipments into an export
pub const CLOSE_SHIPMENT_PATH: &str = "fba/api/close_shipment";

/// Relative API path for downloading an exported commodities file
pub const DOWNLOAD_SHIPMENT_FILE_PATH: &str = "fba/api/download_shipment_file";

/// Relative API path for downloading an exported address file
pub const DOWNLOAD_ADDRESS_FILE_PATH: &str = "fba/api/download_address_file";

/// Settings file name, looked up in the working directory first
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Per-user fallback directory holding the settings file
pub const USER_CONFIG_DIR: &str = ".manifestor";

/// Application name
#[allow(dead_code)]
pub const APP_NAME: &str = "Manifestor TUI";

/// Application version
#[allow(dead_code)]
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
