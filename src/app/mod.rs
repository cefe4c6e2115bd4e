//! Application shell - explicit page state machine and event handling
//!
//! The shell owns a [`Page`] value and a transition table; key events
//! map to [`UiEvent`]s per page and drive model refreshes and file
//! updates.

pub mod page;
pub mod state;

pub use page::{key_to_ui_event, transition, Page, UiEvent};
pub use state::{AppState, Flow, MENU_ITEMS};
