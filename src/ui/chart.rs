use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Sparkline};
use ratatui::Frame;

use crate::app::App;

/// Draw the RX/TX rate history as two side-by-side sparklines.
/// History holds one KiB/s value per tick; the visible slice is the last
/// `width` ticks so the chart scrolls with the session.
pub fn draw_charts(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_history(
        f,
        halves[0],
        " RX ",
        &app.in_history,
        Color::Green,
    );
    draw_history(
        f,
        halves[1],
        " TX ",
        &app.out_history,
        Color::Magenta,
    );
}

fn draw_history(f: &mut Frame, area: Rect, label: &str, history: &[u64], color: Color) {
    let visible = (area.width as usize).saturating_sub(2);
    let start = history.len().saturating_sub(visible);
    let data = &history[start..];

    let peak_kib = data.iter().copied().max().unwrap_or(0);
    let title = format!("{label}(peak {:.2} MB/s) ", peak_kib as f64 / 1024.0);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .data(data)
        .style(Style::default().fg(color));
    f.render_widget(sparkline, area);
}
