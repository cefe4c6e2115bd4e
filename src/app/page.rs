//! Page state machine - explicit pages, events, and transition table

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The three application pages
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Page {
    #[default]
    MainMenu,
    CurrentShipments,
    ShipmentExports,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::MainMenu => "Main Menu",
            Page::CurrentShipments => "Current Shipments",
            Page::ShipmentExports => "Shipment Exports",
        }
    }
}

/// Events generated from user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    // Navigation
    OpenCurrentShipments,
    OpenShipmentExports,
    Back,
    SelectionUp,
    SelectionDown,
    /// Activate the selected main menu entry
    Activate,

    // Actions
    /// Close the selected shipment into a new export
    CreateExport,
    /// Re-download the shipping files for the selected export
    ReprocessExport,

    // System
    Quit,
}

/// Map a key press to an event, given the active page
pub fn key_to_ui_event(key: KeyEvent, page: Page) -> Option<UiEvent> {
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    match page {
        Page::MainMenu => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
            KeyCode::Char('1') | KeyCode::Char('s') => Some(UiEvent::OpenCurrentShipments),
            KeyCode::Char('2') | KeyCode::Char('e') => Some(UiEvent::OpenShipmentExports),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectionUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectionDown),
            KeyCode::Enter => Some(UiEvent::Activate),
            _ => None,
        },
        Page::CurrentShipments => match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Esc | KeyCode::Backspace => Some(UiEvent::Back),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectionUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectionDown),
            KeyCode::Enter | KeyCode::Char('c') => Some(UiEvent::CreateExport),
            _ => None,
        },
        Page::ShipmentExports => match key.code {
            KeyCode::Char('q') => Some(UiEvent::Quit),
            KeyCode::Esc | KeyCode::Backspace => Some(UiEvent::Back),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectionUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectionDown),
            KeyCode::Enter | KeyCode::Char('r') => Some(UiEvent::ReprocessExport),
            _ => None,
        },
    }
}

/// Transition table for page-changing events
///
/// Returns the next page, or `None` when the event keeps the current
/// page. Actions that complete a page's purpose (creating an export,
/// reprocessing one) fall back to the main menu, like the original
/// cancel buttons.
pub fn transition(page: Page, event: UiEvent) -> Option<Page> {
    match (page, event) {
        (Page::MainMenu, UiEvent::OpenCurrentShipments) => Some(Page::CurrentShipments),
        (Page::MainMenu, UiEvent::OpenShipmentExports) => Some(Page::ShipmentExports),
        (Page::CurrentShipments, UiEvent::Back | UiEvent::CreateExport) => Some(Page::MainMenu),
        (Page::ShipmentExports, UiEvent::Back | UiEvent::ReprocessExport) => Some(Page::MainMenu),
        _ => None,
    }
}
