//! netmon — console network traffic monitor.
//!
//! Prints one status line per tick, overwritten in place, plus interim
//! statistics on Space/s and an end-of-session block on q/Esc. The layout
//! follows the classic fixed-width table:
//!
//! ```text
//! **************************NETWORK MONITOR**************************
//!  TIMESTAMP| IN [MB/s] | OUT [MB/s] | TOTAL IN [MB] | TOTAL OUT [MB]
//! -------------------------------------------------------------------
//!  14:02:11 |   1.52    |    0.08    |     12.44     |      0.71
//! ```

use std::io::{self, Write};
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::warn;

use nettop::format::{
    center, center_with, fmt_duration, fmt_mb, table_width, tick_timestamp, timestamp_width,
};
use nettop::logfile::SessionLog;
use nettop::logging;
use nettop::net::monitor::{Command, Monitor, MonitorEvent, PollingConfig};
use nettop::net::sampler::{InterimRow, SessionSummary, TrafficRow};
use nettop::net::source::{resolve_adapter, CounterSource, SysinfoSource};

#[derive(Parser, Debug)]
#[command(name = "netmon", about = "Console network traffic monitor", version)]
struct Opts {
    /// Network adapter to monitor (default: first real adapter)
    #[arg(short, long)]
    adapter: Option<String>,

    /// Polling interval in seconds (floor 0.25)
    #[arg(short, long, default_value_t = 0.25, value_parser = parse_interval)]
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
    logging::init_stderr(logging::level_from_str(&opts.log_level));

    // Pre-flight: an empty adapter set is fatal, a wrong name falls back.
    let mut source = SysinfoSource::new();
    let adapters = source
        .list_adapters()
        .context("cannot start monitoring")?;
    let resolved = resolve_adapter(opts.adapter.as_deref(), &adapters)?;
    if let Some(requested) = &resolved.requested {
        println!(
            "Connection '{requested}' not available, using '{}'",
            resolved.name
        );
    }

    let config = PollingConfig::new(opts.interval, opts.log);
    let monitor = Monitor::spawn(source, config, resolved.name.clone())?;

    // Raw mode: hotkeys without Enter. All output below uses \r\n explicitly.
    enable_raw_mode()?;
    let result = run(&monitor, config, resolved.name, adapters);
    disable_raw_mode()?;

    monitor.send(Command::Quit);
    monitor.join();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Hotkey and event loop. Returns once the worker delivers the final summary.
fn run(
    monitor: &Monitor,
    mut config: PollingConfig,
    adapter: String,
    adapters: Vec<String>,
) -> Result<()> {
    // Column layout is fixed at session start, like the table header
    let ts_width = timestamp_width(config.interval_secs);
    let width = table_width(config.interval_secs);
    let column_interval = config.interval_secs;

    let mut adapter = adapter;
    let mut session_log = SessionLog::new(config.interval_secs);

    print_banner(width, ts_width);
    if config.logging_enabled {
        print_plain(&format!("Logging to {}", session_log.path().display()));
    }

    loop {
        // Hotkeys, polled with a short timeout so rows stay fresh
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => monitor.send(Command::Quit),
                        KeyCode::Char('c')
                            if key.modifiers.contains(KeyModifiers::CONTROL) =>
                        {
                            monitor.send(Command::Quit)
                        }
                        KeyCode::Char(' ') | KeyCode::Char('s') => monitor.send(Command::Mark),
                        KeyCode::Char('c') => monitor.send(Command::ClearInterim),
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            config.increase_interval();
                            monitor.send(Command::SetInterval(config.interval_secs));
                            print_line(&format!(
                                "polling every {:.2}s from the next tick",
                                config.interval_secs
                            ));
                        }
                        KeyCode::Char('-') | KeyCode::Char('_') => {
                            config.decrease_interval();
                            monitor.send(Command::SetInterval(config.interval_secs));
                            print_line(&format!(
                                "polling every {:.2}s from the next tick",
                                config.interval_secs
                            ));
                        }
                        KeyCode::Tab | KeyCode::Char('a') => {
                            if let Some(next) = next_adapter(&adapters, &adapter) {
                                monitor.send(Command::SetAdapter(next));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        // Drain monitor events
        loop {
            match monitor.events().try_recv() {
                Ok(MonitorEvent::Traffic(row)) => {
                    print_status(&status_row(&row, ts_width, column_interval));
                    if config.logging_enabled {
                        if let Err(err) = session_log.append_row(&row) {
                            warn!("session log write failed: {err}");
                        }
                    }
                }
                Ok(MonitorEvent::Interim(row)) => print_interim(&row, width),
                Ok(MonitorEvent::Summary(summary)) => {
                    print_end_statistics(&summary, width, ts_width);
                    return Ok(());
                }
                Ok(MonitorEvent::Selected {
                    adapter: name,
                    requested,
                }) => {
                    match requested {
                        Some(requested) => print_line(&format!(
                            "'{requested}' not available, using '{name}'"
                        )),
                        None => print_line(&format!("switched to '{name}'")),
                    }
                    adapter = name;
                }
                Ok(MonitorEvent::SampleFailed { error, consecutive }) => {
                    // Report the first failure of a streak; retries are silent
                    if consecutive <= 1 {
                        print_line(&format!("! sample failed: {error}"));
                    }
                }
                Ok(MonitorEvent::Degraded(true)) => {
                    print_line("! repeated sample failures; waiting for the adapter to come back")
                }
                Ok(MonitorEvent::Degraded(false)) => print_line("recovered"),
                Ok(MonitorEvent::Adapters(_)) => {}
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
    }
}

/// Cycle to the next adapter in the startup list (Tab).
fn next_adapter(adapters: &[String], current: &str) -> Option<String> {
    if adapters.len() < 2 {
        return None;
    }
    let idx = adapters
        .iter()
        .position(|name| name == current)
        .unwrap_or(adapters.len() - 1);
    Some(adapters[(idx + 1) % adapters.len()].clone())
}

fn status_row(row: &TrafficRow, ts_width: usize, interval_secs: f64) -> String {
    format!(
        "{}| {} | {} | {} | {}",
        center(&tick_timestamp(&row.wall_time, interval_secs), ts_width),
        center(&fmt_mb(row.rate.in_mb_per_sec), 9),
        center(&fmt_mb(row.rate.out_mb_per_sec), 10),
        center(&fmt_mb(row.total_in_mb), 13),
        center(&fmt_mb(row.total_out_mb), 14),
    )
}

fn print_banner(width: usize, ts_width: usize) {
    print_plain(&center_with("NETWORK MONITOR", width, '*'));
    print_plain(&format!(
        "{}| IN [MB/s] | OUT [MB/s] | TOTAL IN [MB] | TOTAL OUT [MB]",
        center("TIMESTAMP", ts_width)
    ));
    print_plain(&"-".repeat(width));
}

fn print_interim(row: &InterimRow, width: usize) {
    let text = format!(
        " elapsed: {} | received: {} MB | sent: {} MB ",
        fmt_duration(row.elapsed_secs.round() as u64),
        fmt_mb(row.in_mb),
        fmt_mb(row.out_mb),
    );
    print_line(&center_with(&text, width, '*'));
}

fn print_end_statistics(summary: &SessionSummary, width: usize, ts_width: usize) {
    print_line(&center_with("END STATISTICS", width, '*'));
    print_plain(&format!(
        "{}|{}|{}",
        center("DURATION", ts_width),
        center("RECEIVED [MB]", 24),
        center("TRANSMITTED [MB]", 30),
    ));
    print_plain(&"-".repeat(width));
    print_plain(&format!(
        "{}|{}|{}",
        center(&fmt_duration(summary.elapsed_secs), ts_width),
        center(&fmt_mb(summary.in_mb), 24),
        center(&fmt_mb(summary.out_mb), 30),
    ));
    print_plain(&"*".repeat(width));
}

/// Overwrite the status line in place.
fn print_status(text: &str) {
    let mut out = io::stdout();
    let _ = write!(out, "\r{text}");
    let _ = out.flush();
}

/// Full line, breaking away from the in-place status line first.
fn print_line(text: &str) {
    let mut out = io::stdout();
    let _ = write!(out, "\r\n{text}\r\n");
    let _ = out.flush();
}

/// Full line without the leading break (banner and startup notices).
fn print_plain(text: &str) {
    let mut out = io::stdout();
    let _ = write!(out, "{text}\r\n");
    let _ = out.flush();
}
