use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, AppMode};

/// Key definitions: (key_label, description)
const KEYS_NORMAL: &[(&str, &str)] = &[
    ("F1", "Help  "),
    ("Space", "Mark  "),
    ("c", "Clear "),
    ("+/-", "Interval "),
    ("a", "Adapter "),
    ("L", "Log   "),
    ("z", "Pause "),
    ("q", "Quit  "),
];

const KEYS_MENU: &[(&str, &str)] = &[
    ("↑/↓", "Navigate "),
    ("Enter", "Select "),
    ("Esc", "Cancel "),
];

/// Draw the bottom key bar (key in black-on-cyan, description on dark)
pub fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    // Full-width dark background first
    let bg_fill = " ".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(bg_fill).style(Style::default().bg(Color::Indexed(234))),
        area,
    );

    let keys = match app.mode {
        AppMode::AdapterSelect => KEYS_MENU,
        _ => KEYS_NORMAL,
    };

    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in keys {
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{desc} "),
            Style::default().fg(Color::White).bg(Color::Indexed(234)),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
