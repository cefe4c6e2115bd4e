//! # Manifestor TUI
//!
//! A terminal tool for warehouse operators: review currently open
//! shipments, close them into an export batch, and keep two local CSV
//! files (commodities, address) synchronized with the most recent
//! export downloaded from the shipment-management API.
//!
//! ## Architecture
//! Single-threaded and synchronous:
//! - UI Layer (Ratatui) - terminal rendering and key events
//! - App Layer - explicit page state machine
//! - Request Layer (blocking reqwest) - POST wrapper with a shared
//!   error-wrapping convention
//! - File Manager - CSV download and reconciliation status

pub mod api;
pub mod app;
pub mod constants;
pub mod files;
pub mod models;
pub mod settings;
pub mod ui;

// Re-export commonly used types
pub use api::{ApiClient, ExportDownloader, RequestError};
pub use app::{AppState, Flow, Page, UiEvent};
pub use files::{FileStatus, ShipmentFileManager};
pub use models::{CurrentShipments, Export, Shipment, ShipmentExports};
pub use settings::{Settings, SettingsError};
