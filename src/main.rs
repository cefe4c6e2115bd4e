//! Manifestor TUI - shipment manifest tool
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - explicit page state machine
//! - Request Layer (blocking reqwest) - POST wrapper around the
//!   shipment-management API

mod api;
mod app;
mod constants;
mod files;
mod models;
mod settings;
mod ui;

use std::io;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tracing::error;

use api::ApiClient;
use app::{key_to_ui_event, AppState, Flow, Page, MENU_ITEMS};
use files::ShipmentFileManager;
use models::{EXPORT_HEADINGS, SHIPMENT_HEADINGS};
use settings::Settings;
use ui::{status_color, theme_color, windowed};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging to file
    let file_appender = tracing_appender::rolling::never(".", "manifestor.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let _guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal);

    // Show the error before exiting; the error still terminates the
    // program once acknowledged
    if let Err(err) = &result {
        error!("terminating on error: {:#}", err);
        show_error_screen(&mut terminal, err)?;
    }

    result
}

/// Run the application loop until quit or failure
fn run(terminal: &mut Terminal<impl Backend>) -> anyhow::Result<()> {
    let settings = Settings::load()?;
    let accent = theme_color(&settings.theme);
    let window = (settings.window_width, settings.window_height);

    let api = ApiClient::new(&settings);
    let file_manager = ShipmentFileManager::new(&settings);
    let mut app = AppState::new(api, file_manager);
    app.initialise()?;

    loop {
        terminal.draw(|f| draw_ui(f, &app, accent, window))?;

        // Block until the next key; the only other wait points are
        // in-flight HTTP calls
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(ui_event) = key_to_ui_event(key, app.page) {
                match app.handle_event(ui_event)? {
                    Flow::Exit => break,
                    Flow::Continue => {}
                }
            }
        }
    }

    Ok(())
}

/// Block on the error screen until the user acknowledges
fn show_error_screen(
    terminal: &mut Terminal<impl Backend>,
    err: &anyhow::Error,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| draw_error(f, err))?;
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if matches!(
                key.code,
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('o')
            ) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, app: &AppState, accent: Color, window: (u16, u16)) {
    let area = windowed(f.area(), window.0, window.1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Page content
            Constraint::Length(2), // File status footer
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    match app.page {
        Page::MainMenu => draw_main_menu(f, app, accent, chunks[0]),
        Page::CurrentShipments => draw_shipments_table(f, app, accent, chunks[0]),
        Page::ShipmentExports => draw_exports_table(f, app, accent, chunks[0]),
    }

    draw_file_status(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);
}

fn draw_main_menu(f: &mut Frame, app: &AppState, accent: Color, area: Rect) {
    let items: Vec<ListItem> = MENU_ITEMS.iter().map(|item| ListItem::new(*item)).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(format!(" {} ", Page::MainMenu.title())),
        )
        .highlight_style(Style::default().fg(accent).bold())
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(app.menu_selected));
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Convert a display row into table cells, with "-" for absent fields
fn row_cells(row: &models::DisplayRow) -> Row<'static> {
    Row::new(
        row.iter()
            .map(|cell| cell.clone().unwrap_or_else(|| String::from("-")))
            .collect::<Vec<_>>(),
    )
}

fn draw_shipments_table(f: &mut Frame, app: &AppState, accent: Color, area: Rect) {
    let rows: Vec<Row> = app
        .current_shipments
        .get_display_rows()
        .iter()
        .map(row_cells)
        .collect();

    let widths = [
        Constraint::Length(35),
        Constraint::Length(20),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(SHIPMENT_HEADINGS).style(Style::default().bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(format!(
                    " {} ({}) ",
                    Page::CurrentShipments.title(),
                    app.current_shipments.len()
                )),
        )
        .row_highlight_style(Style::default().fg(accent).bold())
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    table_state.select(Some(app.shipment_selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_exports_table(f: &mut Frame, app: &AppState, accent: Color, area: Rect) {
    let rows: Vec<Row> = app
        .shipment_exports
        .get_display_rows()
        .iter()
        .map(row_cells)
        .collect();

    let widths = [
        Constraint::Length(40),
        Constraint::Length(15),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(15),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(EXPORT_HEADINGS).style(Style::default().bold()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(format!(
                    " {} ({}) ",
                    Page::ShipmentExports.title(),
                    app.shipment_exports.len()
                )),
        )
        .row_highlight_style(Style::default().fg(accent).bold())
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    table_state.select(Some(app.export_selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_file_status(f: &mut Frame, app: &AppState, area: Rect) {
    let lines = vec![
        Line::from(vec![
            Span::raw("Commodities File: "),
            Span::styled(
                app.commodities_status.to_string(),
                Style::default().fg(status_color(&app.commodities_status)),
            ),
        ]),
        Line::from(vec![
            Span::raw("Address File: "),
            Span::styled(
                app.address_status.to_string(),
                Style::default().fg(status_color(&app.address_status)),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_status_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let hints = match app.page {
        Page::MainMenu => " up/down:select | Enter:open | 1/2:pages | q:quit ",
        Page::CurrentShipments => " up/down:select | Enter/c:create export | Esc:back | q:quit ",
        Page::ShipmentExports => " up/down:select | Enter/r:reprocess files | Esc:back | q:quit ",
    };
    let bar = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_error(f: &mut Frame, err: &anyhow::Error) {
    let area = f.area();
    let popup_area = centered_rect(70, 50, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Manifestor Error ")
        .style(Style::default().bg(Color::Black));

    let text = format!("ERROR\n\n{:#}\n\nPress Enter to close.", err);
    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
