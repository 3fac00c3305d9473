use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode};
use crate::net::monitor::{Command, Monitor};

/// Handle a single key input event.
pub fn handle_input(app: &mut App, monitor: &Monitor, key: KeyEvent) {
    match app.mode {
        AppMode::Normal => handle_normal_mode(app, monitor, key),
        AppMode::Help => handle_help_mode(app, key),
        AppMode::AdapterSelect => handle_adapter_mode(app, monitor, key),
    }
}

// ── Normal mode ─────────────────────────────────────────────────────────

fn handle_normal_mode(app: &mut App, monitor: &Monitor, key: KeyEvent) {
    match key.code {
        // ── Quit ──
        KeyCode::Char('q') | KeyCode::Esc | KeyCode::F(10) => request_quit(app, monitor),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            request_quit(app, monitor);
        }

        // ── Interim checkpoint ──
        KeyCode::Char(' ') | KeyCode::Char('s') => monitor.send(Command::Mark),
        KeyCode::Char('c') => {
            // Drop the checkpoint and the marks table; next mark measures
            // from the session Baseline again
            app.marks.clear();
            monitor.send(Command::ClearInterim);
            app.notice = Some("marks cleared".into());
        }

        // ── Polling interval (takes effect on the next tick) ──
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.config.increase_interval();
            monitor.send(Command::SetInterval(app.config.interval_secs));
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            app.config.decrease_interval();
            monitor.send(Command::SetInterval(app.config.interval_secs));
        }

        // ── Adapter picker ──
        KeyCode::Char('a') | KeyCode::Tab => {
            app.open_adapter_menu();
            // Refresh the list; the reply updates the menu when it lands
            monitor.send(Command::ListAdapters);
        }

        // ── Session log toggle ──
        KeyCode::Char('L') | KeyCode::Char('l') => {
            app.config.logging_enabled = !app.config.logging_enabled;
            app.notice = Some(match (&app.log_path, app.config.logging_enabled) {
                (Some(path), true) => format!("logging to {path}"),
                _ => "logging off".into(),
            });
        }

        // ── Freeze display (sampling continues) ──
        KeyCode::Char('z') | KeyCode::Char('Z') => app.paused = !app.paused,

        // ── Help ──
        KeyCode::F(1) | KeyCode::Char('h') | KeyCode::Char('?') => app.mode = AppMode::Help,

        _ => {}
    }
}

fn request_quit(app: &mut App, monitor: &Monitor) {
    // The worker observes the request on its next tick and replies with the
    // end-of-session summary; the main loop exits when that arrives.
    app.should_quit = true;
    monitor.send(Command::Quit);
}

// ── Help overlay ────────────────────────────────────────────────────────

fn handle_help_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') | KeyCode::Enter => {
            app.mode = AppMode::Normal;
        }
        _ => {}
    }
}

// ── Adapter picker ──────────────────────────────────────────────────────

fn handle_adapter_mode(app: &mut App, monitor: &Monitor, key: KeyEvent) {
    match key.code {
        KeyCode::Up => app.adapter_menu_prev(),
        KeyCode::Down => app.adapter_menu_next(),
        KeyCode::Home => app.adapter_menu_index = 0,
        KeyCode::End => {
            app.adapter_menu_index = app.adapters.len().saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(name) = app.adapter_menu_selection() {
                if name != app.adapter {
                    monitor.send(Command::SetAdapter(name.to_string()));
                }
            }
            app.mode = AppMode::Normal;
        }
        KeyCode::Esc | KeyCode::Char('a') | KeyCode::Tab => app.mode = AppMode::Normal,
        _ => {}
    }
}
