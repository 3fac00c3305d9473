//! nettop — full-screen network throughput dashboard.
//!
//! Features:
//!   - Live RX/TX rate meters for a chosen adapter
//!   - Cumulative totals since session start
//!   - Interim checkpoints ("since last mark") in a table
//!   - Rate history charts
//!   - Adapter picker, runtime interval control, session log file
//!
//! Keybindings: Press F1 or '?' for help.

use std::io;
use std::path::Path;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::warn;
use ratatui::{backend::CrosstermBackend, Terminal};

use nettop::app::App;
use nettop::format::{fmt_duration, fmt_mb};
use nettop::input;
use nettop::logfile::SessionLog;
use nettop::logging;
use nettop::net::monitor::{Monitor, MonitorEvent, PollingConfig};
use nettop::net::sampler::SessionSummary;
use nettop::net::source::{resolve_adapter, CounterSource, SysinfoSource};
use nettop::ui;

/// Diagnostics go to a file: the alternate screen owns the terminal
const DIAG_LOG_FILE: &str = "nettop.log";

#[derive(Parser, Debug)]
#[command(name = "nettop", about = "Full-screen network throughput dashboard", version)]
struct Opts {
    /// Network adapter to monitor (default: first real adapter)
    #[arg(short, long)]
    adapter: Option<String>,

    /// Polling interval in seconds (floor 0.25)
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_interval)]
    interval: f64,

    /// Append each tick to a session log file
    #[arg(short, long)]
    log: bool,

    /// Diagnostic log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err("interval must be greater than zero".into())
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    logging::init_file(logging::level_from_str(&opts.log_level), Path::new(DIAG_LOG_FILE))?;

    // Pre-flight: an empty adapter set is fatal, a wrong name falls back.
    let mut source = SysinfoSource::new();
    let adapters = source
        .list_adapters()
        .context("cannot start monitoring")?;
    let resolved = resolve_adapter(opts.adapter.as_deref(), &adapters)?;

    let config = PollingConfig::new(opts.interval, opts.log);
    let mut app = App::new(resolved.name.clone(), adapters, config);
    if let Some(requested) = &resolved.requested {
        app.notice = Some(format!(
            "'{requested}' not available, using '{}'",
            resolved.name
        ));
    }

    let session_log = SessionLog::new(config.interval_secs);
    app.log_path = Some(session_log.path().display().to_string());

    let monitor = Monitor::spawn(source, config, resolved.name)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app, &monitor, session_log);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(Some(summary)) => {
            print_summary(&app, &summary);
            monitor.join();
            Ok(())
        }
        Ok(None) => {
            monitor.join();
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Main application loop. Returns the end-of-session summary once the worker
/// acknowledges the quit request.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    monitor: &Monitor,
    mut session_log: SessionLog,
) -> Result<Option<SessionSummary>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Handle keys with a short timeout so monitor events stay fresh
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    // On Windows, crossterm fires Press and Release; only handle Press
                    if key.kind == KeyEventKind::Press {
                        input::handle_input(app, monitor, key);
                    }
                }
                Event::Resize(_, _) => {
                    // Handled on next draw
                }
                _ => {}
            }
        }

        // Drain monitor events
        loop {
            match monitor.events().try_recv() {
                Ok(MonitorEvent::Traffic(row)) => {
                    if app.config.logging_enabled {
                        if let Err(err) = session_log.append_row(&row) {
                            warn!("session log write failed: {err}");
                            app.last_error = Some(format!("log write failed: {err}"));
                        }
                    }
                    if !app.paused {
                        app.push_row(row);
                    }
                }
                Ok(MonitorEvent::Summary(summary)) => return Ok(Some(summary)),
                Ok(other) => app.apply_event(other),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // Worker gone; nothing more will arrive
                    return Ok(None);
                }
            }
        }
    }
}

/// One-line session summary, printed after the terminal is restored.
fn print_summary(app: &App, summary: &SessionSummary) {
    println!(
        "Session on '{}': {} | received {} MB | sent {} MB",
        app.adapter,
        fmt_duration(summary.elapsed_secs),
        fmt_mb(summary.in_mb),
        fmt_mb(summary.out_mb),
    );
    if app.config.logging_enabled {
        if let Some(path) = &app.log_path {
            println!("Session log: {path}");
        }
    }
}
