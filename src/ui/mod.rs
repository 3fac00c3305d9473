pub mod adapter_menu;
pub mod chart;
pub mod footer;
pub mod header;
pub mod help;
pub mod table;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::app::{App, AppMode};

/// Header panel height (adapter line, rates, totals, status + borders)
pub const HEADER_HEIGHT: u16 = 8;

/// Render the complete UI
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT), // session meters
            Constraint::Length(8),             // rate history charts
            Constraint::Min(4),                // session & marks table
            Constraint::Length(1),             // key bar
        ])
        .split(size);

    header::draw_header(f, app, chunks[0]);
    chart::draw_charts(f, app, chunks[1]);
    table::draw_marks_table(f, app, chunks[2]);
    footer::draw_footer(f, app, chunks[3]);

    // Overlay popups
    match app.mode {
        AppMode::Help => help::draw_help(f),
        AppMode::AdapterSelect => adapter_menu::draw_adapter_menu(f, app),
        AppMode::Normal => {}
    }
}
