use chrono::{DateTime, Local};

use crate::net::monitor::{MonitorEvent, PollingConfig};
use crate::net::sampler::{InterimRow, RateSample, TrafficRow};

/// Which view/mode the dashboard is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Help,
    AdapterSelect, // a/Tab: adapter picker overlay
}

/// Rate-history samples kept for the charts
pub const HISTORY_LEN: usize = 300;

/// Interim marks kept in the table
const MAX_MARKS: usize = 256;

/// Main dashboard state. Pure presentation data: everything in here is a
/// fold over the monitor's event stream plus operator toggles.
pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub paused: bool, // z: freeze display, sampling continues

    // Adapter selection
    pub adapter: String,
    pub adapters: Vec<String>,
    pub adapter_menu_index: usize,

    // Polling configuration (mirrors what the worker was last told)
    pub config: PollingConfig,
    pub log_path: Option<String>,

    // Live statistics from the latest tick
    pub session_started: DateTime<Local>,
    pub rate: Option<RateSample>,
    pub total_in_mb: f64,
    pub total_out_mb: f64,
    pub last_row_at: Option<DateTime<Local>>,

    // Rate history for the charts, KiB/s per tick
    pub in_history: Vec<u64>,
    pub out_history: Vec<u64>,

    // Interim marks table
    pub marks: Vec<InterimRow>,

    // Status surface
    pub degraded: bool,
    pub notice: Option<String>,
    pub last_error: Option<String>,

    pub tick: u64,
}

impl App {
    pub fn new(adapter: String, adapters: Vec<String>, config: PollingConfig) -> Self {
        Self {
            mode: AppMode::Normal,
            should_quit: false,
            paused: false,

            adapter,
            adapters,
            adapter_menu_index: 0,

            config,
            log_path: None,

            session_started: Local::now(),
            rate: None,
            total_in_mb: 0.0,
            total_out_mb: 0.0,
            last_row_at: None,

            in_history: Vec::new(),
            out_history: Vec::new(),

            marks: Vec::new(),

            degraded: false,
            notice: None,
            last_error: None,

            tick: 0,
        }
    }

    /// Fold a per-tick traffic row into the display state.
    pub fn push_row(&mut self, row: TrafficRow) {
        self.rate = Some(row.rate);
        self.total_in_mb = row.total_in_mb;
        self.total_out_mb = row.total_out_mb;
        self.last_row_at = Some(row.wall_time);
        self.last_error = None;

        self.in_history
            .push((row.rate.in_mb_per_sec * 1024.0).round() as u64);
        self.out_history
            .push((row.rate.out_mb_per_sec * 1024.0).round() as u64);
        if self.in_history.len() > HISTORY_LEN {
            self.in_history.remove(0);
            self.out_history.remove(0);
        }
        self.tick += 1;
    }

    /// Fold a non-traffic monitor event into the display state.
    /// Traffic rows and the final summary are handled by the main loop
    /// (they also drive the session log and shutdown).
    pub fn apply_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Adapters(list) => {
                self.adapters = list;
                self.clamp_adapter_menu();
            }
            MonitorEvent::Selected { adapter, requested } => {
                self.notice = Some(match &requested {
                    Some(requested) => {
                        format!("'{requested}' not available, using '{adapter}'")
                    }
                    None => format!("switched to '{adapter}'"),
                });
                self.adapter = adapter;
                // Fresh Baseline on the worker side: restart the session clock.
                // Display history and marks stay; they belong to this sink.
                self.session_started = Local::now();
                self.rate = None;
                self.total_in_mb = 0.0;
                self.total_out_mb = 0.0;
            }
            MonitorEvent::SampleFailed { error, .. } => {
                self.last_error = Some(error);
            }
            MonitorEvent::Degraded(flag) => {
                self.degraded = flag;
                if !flag {
                    self.last_error = None;
                }
            }
            MonitorEvent::Interim(row) => {
                self.marks.push(row);
                if self.marks.len() > MAX_MARKS {
                    self.marks.remove(0);
                }
            }
            MonitorEvent::Traffic(_) | MonitorEvent::Summary(_) => {}
        }
    }

    /// Elapsed seconds since the current Baseline
    pub fn elapsed_secs(&self) -> u64 {
        (Local::now() - self.session_started).num_seconds().max(0) as u64
    }

    // ── Adapter picker ──────────────────────────────────────────────────

    /// Open the picker with the cursor on the active adapter.
    pub fn open_adapter_menu(&mut self) {
        self.adapter_menu_index = self
            .adapters
            .iter()
            .position(|name| *name == self.adapter)
            .unwrap_or(0);
        self.mode = AppMode::AdapterSelect;
    }

    pub fn adapter_menu_prev(&mut self) {
        if self.adapter_menu_index > 0 {
            self.adapter_menu_index -= 1;
        }
    }

    pub fn adapter_menu_next(&mut self) {
        if self.adapter_menu_index + 1 < self.adapters.len() {
            self.adapter_menu_index += 1;
        }
    }

    pub fn adapter_menu_selection(&self) -> Option<&str> {
        self.adapters.get(self.adapter_menu_index).map(String::as_str)
    }

    fn clamp_adapter_menu(&mut self) {
        if self.adapter_menu_index >= self.adapters.len() {
            self.adapter_menu_index = self.adapters.len().saturating_sub(1);
        }
    }
}
