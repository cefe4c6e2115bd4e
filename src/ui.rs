//! UI style helpers

use ratatui::prelude::*;

use crate::files::FileStatus;

/// Accent color for a configured theme name
///
/// Unknown names fall back to cyan rather than failing startup.
pub fn theme_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "cyan" => Color::Cyan,
        "magenta" => Color::Magenta,
        "green" => Color::Green,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "red" => Color::Red,
        "white" => Color::White,
        _ => Color::Cyan,
    }
}

/// Color for a file status line
pub fn status_color(status: &FileStatus) -> Color {
    match status {
        FileStatus::Missing => Color::Yellow,
        FileStatus::Invalid => Color::Red,
        FileStatus::Orders(_) => Color::Green,
    }
}

/// Clamp the drawing area to the configured window size
pub fn windowed(area: Rect, max_width: u16, max_height: u16) -> Rect {
    Rect {
        x: area.x,
        y: area.y,
        width: area.width.min(max_width),
        height: area.height.min(max_height),
    }
}
