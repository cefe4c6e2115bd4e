//! App state - models, file statuses, and the event handling loop body

use anyhow::Result;
use tracing::info;

use crate::api::ApiClient;
use crate::app::page::{transition, Page, UiEvent};
use crate::files::{FileStatus, ShipmentFileManager};
use crate::models::{CurrentShipments, ShipmentExports};

/// Main menu entries, in display order
pub const MENU_ITEMS: [&str; 3] = ["Current Shipments", "Shipment Exports", "Quit"];

/// Outcome of handling one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Application state owned by the shell
pub struct AppState {
    pub page: Page,
    pub menu_selected: usize,
    pub shipment_selected: usize,
    pub export_selected: usize,

    pub current_shipments: CurrentShipments,
    pub shipment_exports: ShipmentExports,
    pub file_manager: ShipmentFileManager,

    pub commodities_status: FileStatus,
    pub address_status: FileStatus,

    api: ApiClient,
}

impl AppState {
    pub fn new(api: ApiClient, file_manager: ShipmentFileManager) -> Self {
        let commodities_status = file_manager.get_commodities_file_status();
        let address_status = file_manager.get_address_file_status();
        AppState {
            page: Page::MainMenu,
            menu_selected: 0,
            shipment_selected: 0,
            export_selected: 0,
            current_shipments: CurrentShipments::default(),
            shipment_exports: ShipmentExports::default(),
            file_manager,
            commodities_status,
            address_status,
            api,
        }
    }

    /// Fetch both record lists so the first render is populated
    pub fn initialise(&mut self) -> Result<()> {
        self.current_shipments.update(&self.api)?;
        self.shipment_exports.update(&self.api)?;
        Ok(())
    }

    /// Handle one event; errors propagate to the shell, which displays
    /// them and terminates
    pub fn handle_event(&mut self, event: UiEvent) -> Result<Flow> {
        match event {
            UiEvent::Quit => return Ok(Flow::Exit),

            UiEvent::SelectionUp => self.move_selection(-1),
            UiEvent::SelectionDown => self.move_selection(1),

            UiEvent::Activate if self.page == Page::MainMenu => {
                let event = match self.menu_selected {
                    0 => UiEvent::OpenCurrentShipments,
                    1 => UiEvent::OpenShipmentExports,
                    _ => UiEvent::Quit,
                };
                return self.handle_event(event);
            }
            UiEvent::Activate => {}

            UiEvent::CreateExport if self.page == Page::CurrentShipments => {
                // Disabled while the shipment list is empty
                let shipment_id = match self.current_shipments.shipments.get(self.shipment_selected)
                {
                    Some(shipment) => shipment.id,
                    None => return Ok(Flow::Continue),
                };
                let export_id = self.current_shipments.close_shipment(&self.api, shipment_id)?;
                info!(shipment_id, export_id, "closed shipments into new export");
                self.file_manager.update_shipping_files(&self.api, export_id)?;
                self.current_shipments.update(&self.api)?;
            }
            UiEvent::CreateExport => {}

            UiEvent::ReprocessExport if self.page == Page::ShipmentExports => {
                let export_id = match self.shipment_exports.get(self.export_selected) {
                    Some(export) => export.id,
                    None => return Ok(Flow::Continue),
                };
                info!(export_id, "reprocessing shipping files");
                self.file_manager.update_shipping_files(&self.api, export_id)?;
            }
            UiEvent::ReprocessExport => {}

            UiEvent::OpenCurrentShipments
            | UiEvent::OpenShipmentExports
            | UiEvent::Back => {}
        }

        if let Some(next) = transition(self.page, event) {
            self.enter_page(next)?;
        }
        Ok(Flow::Continue)
    }

    /// Activate a page: refresh its record list and both file statuses
    fn enter_page(&mut self, next: Page) -> Result<()> {
        match next {
            Page::MainMenu => {}
            Page::CurrentShipments => {
                self.current_shipments.update(&self.api)?;
                self.shipment_selected = 0;
            }
            Page::ShipmentExports => {
                self.shipment_exports.update(&self.api)?;
                self.export_selected = 0;
            }
        }
        self.update_shipment_file_status();
        self.page = next;
        Ok(())
    }

    /// Recompute both file statuses from disk
    pub fn update_shipment_file_status(&mut self) {
        self.commodities_status = self.file_manager.get_commodities_file_status();
        self.address_status = self.file_manager.get_address_file_status();
    }

    fn move_selection(&mut self, delta: isize) {
        let len = match self.page {
            Page::MainMenu => MENU_ITEMS.len(),
            Page::CurrentShipments => self.current_shipments.len(),
            Page::ShipmentExports => self.shipment_exports.len(),
        };
        if len == 0 {
            return;
        }
        let selected = match self.page {
            Page::MainMenu => &mut self.menu_selected,
            Page::CurrentShipments => &mut self.shipment_selected,
            Page::ShipmentExports => &mut self.export_selected,
        };
        let next = selected.saturating_add_signed(delta).min(len - 1);
        *selected = next;
    }

    /// Selected row index on the current page
    pub fn selected(&self) -> usize {
        match self.page {
            Page::MainMenu => self.menu_selected,
            Page::CurrentShipments => self.shipment_selected,
            Page::ShipmentExports => self.export_selected,
        }
    }
}
