use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::format::{fmt_duration, fmt_mb, truncate_to_width};

/// Draw the session header: adapter, polling settings, live rates, totals
/// and the status/notice line.
pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let name_budget = (area.width as usize).saturating_sub(30).max(8);
    let adapter = truncate_to_width(&app.adapter, name_budget);
    let hz = 1.0 / app.config.interval_secs;

    let mut flags: Vec<Span> = Vec::new();
    if app.config.logging_enabled {
        flags.push(Span::styled(
            " LOG ",
            Style::default().fg(Color::Black).bg(Color::Green),
        ));
    }
    if app.paused {
        flags.push(Span::styled(
            " PAUSED ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    if app.degraded {
        flags.push(Span::styled(
            " DEGRADED ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let mut first_line = vec![
        Span::raw("Adapter: "),
        Span::styled(adapter, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "   every {:.2}s ({:.2} Hz)  ",
            app.config.interval_secs, hz
        )),
    ];
    first_line.extend(flags);

    let (rate_in, rate_out) = match &app.rate {
        Some(rate) => (fmt_mb(rate.in_mb_per_sec), fmt_mb(rate.out_mb_per_sec)),
        None => ("-.--".into(), "-.--".into()),
    };

    let lines = vec![
        Line::from(first_line),
        Line::from(vec![
            Span::raw("In:  "),
            Span::styled(
                format!("{rate_in:>10} MB/s"),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("    Out: "),
            Span::styled(
                format!("{rate_out:>10} MB/s"),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("Total in: "),
            Span::styled(
                format!("{:>10} MB", fmt_mb(app.total_in_mb)),
                Style::default().fg(Color::Green),
            ),
            Span::raw("    Total out: "),
            Span::styled(
                format!("{:>10} MB", fmt_mb(app.total_out_mb)),
                Style::default().fg(Color::Magenta),
            ),
        ]),
        Line::from(format!(
            "Elapsed: {}   Started: {}",
            fmt_duration(app.elapsed_secs()),
            app.session_started.format("%H:%M:%S"),
        )),
        status_line(app),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" nettop ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

/// Errors win over notices; both are transient and non-blocking.
fn status_line(app: &App) -> Line<'static> {
    if let Some(error) = &app.last_error {
        return Line::from(Span::styled(
            format!("! {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(notice) = &app.notice {
        return Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from("")
}
