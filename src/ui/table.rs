use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Row, Table};
use ratatui::Frame;

use crate::app::App;
use crate::format::{fmt_duration, fmt_mb};

/// Draw the session/marks table: one live row for the running session plus
/// one row per interim mark, newest first.
pub fn draw_marks_table(f: &mut Frame, app: &App, area: Rect) {
    if area.height < 3 {
        return;
    }

    let header = Row::new(vec!["", "TIMESTAMP", "ELAPSED", "IN [MB]", "OUT [MB]"]).style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );

    let mut rows: Vec<Row> = Vec::with_capacity(app.marks.len() + 1);

    // Live session row, measured from the current Baseline
    let session_ts = app
        .last_row_at
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".into());
    rows.push(
        Row::new(vec![
            "Session".to_string(),
            session_ts,
            fmt_duration(app.elapsed_secs()),
            fmt_mb(app.total_in_mb),
            fmt_mb(app.total_out_mb),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    // Interim marks, newest first; numbering follows creation order
    for (i, mark) in app.marks.iter().enumerate().rev() {
        rows.push(Row::new(vec![
            format!("Mark {}", i + 1),
            mark.wall_time.format("%H:%M:%S").to_string(),
            fmt_duration(mark.elapsed_secs.round() as u64),
            fmt_mb(mark.in_mb),
            fmt_mb(mark.out_mb),
        ]));
    }

    let widths = [
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(10),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Session & Marks ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(table, area);
}
