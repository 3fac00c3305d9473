//! The tick loop.
//!
//! A single dedicated worker thread runs the sampling loop: capture, suspend,
//! capture, compute, emit. Control commands arrive on an mpsc channel and are
//! drained exactly once per tick — never mid-sleep — so the worst-case
//! latency for any request equals the current polling interval. Display data
//! leaves the worker as immutable [`MonitorEvent`]s; the worker never touches
//! presentation state.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use crate::net::sampler::{InterimRow, RateSample, Sampler, SessionSummary, TrafficRow};
use crate::net::source::{resolve_adapter, AdapterSample, CounterSource, ResolvedAdapter, SourceError};

/// Hard floor for the polling interval
pub const MIN_INTERVAL_SECS: f64 = 0.25;

/// Consecutive sample failures before the degraded indicator is raised
const DEGRADED_AFTER_FAILURES: u32 = 3;

/// Runtime polling configuration. Interval mutations take effect on the next
/// tick only; the in-flight suspension is never shortened.
#[derive(Debug, Clone, Copy)]
pub struct PollingConfig {
    pub interval_secs: f64,
    pub logging_enabled: bool,
}

impl PollingConfig {
    /// Build a config with the interval clamped to the hard floor.
    /// Non-positive intervals are rejected at the CLI boundary before this.
    pub fn new(interval_secs: f64, logging_enabled: bool) -> Self {
        Self {
            interval_secs: interval_secs.max(MIN_INTERVAL_SECS),
            logging_enabled,
        }
    }

    /// Lengthen the interval: 0.25 s steps below one second, 1 s steps above.
    pub fn increase_interval(&mut self) {
        self.interval_secs = if self.interval_secs < 1.0 {
            self.interval_secs + 0.25
        } else {
            self.interval_secs + 1.0
        };
    }

    /// Shorten the interval with the same step policy, clamped to the floor.
    pub fn decrease_interval(&mut self) {
        let next = if self.interval_secs <= 1.0 {
            self.interval_secs - 0.25
        } else {
            self.interval_secs - 1.0
        };
        self.interval_secs = next.max(MIN_INTERVAL_SECS);
    }
}

/// Operator requests, sent into the worker over a single-producer channel
#[derive(Debug, Clone)]
pub enum Command {
    Quit,
    Mark,
    ClearInterim,
    SetInterval(f64),
    SetAdapter(String),
    ListAdapters,
}

/// Immutable display events emitted by the worker
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// Currently available adapter names (reply to `ListAdapters`)
    Adapters(Vec<String>),
    /// Active adapter changed; `requested` is `Some` when the fallback policy
    /// substituted for an unavailable name
    Selected {
        adapter: String,
        requested: Option<String>,
    },
    Traffic(TrafficRow),
    Interim(InterimRow),
    Summary(SessionSummary),
    /// A sample read failed; Baseline and checkpoint are untouched and the
    /// next tick retries
    SampleFailed { error: String, consecutive: u32 },
    /// Degraded-state indicator (repeated failures / recovery)
    Degraded(bool),
}

/// Handle to the worker thread: command sender plus event receiver
pub struct Monitor {
    commands: Sender<Command>,
    events: Receiver<MonitorEvent>,
    worker: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Start the tick loop on its own thread. `adapter` must already be
    /// resolved against the available set (see [`resolve_adapter`]).
    pub fn spawn<S>(mut source: S, config: PollingConfig, adapter: String) -> Result<Self>
    where
        S: CounterSource + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("nettop-monitor".into())
            .spawn(move || run_loop(&mut source, config, adapter, &cmd_rx, &event_tx))?;

        Ok(Self {
            commands: cmd_tx,
            events: event_rx,
            worker: Some(worker),
        })
    }

    /// Send a control command. A dead worker makes this a no-op.
    pub fn send(&self, cmd: Command) {
        let _ = self.commands.send(cmd);
    }

    pub fn events(&self) -> &Receiver<MonitorEvent> {
        &self.events
    }

    /// Wait for the worker to finish (call after sending [`Command::Quit`]).
    pub fn join(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// List, resolve with the fallback policy, and capture a fresh baseline.
fn select_adapter<S: CounterSource>(
    source: &mut S,
    requested: &str,
) -> Result<(ResolvedAdapter, AdapterSample), SourceError> {
    let available = source.list_adapters()?;
    let resolved = resolve_adapter(Some(requested), &available)?;
    let baseline = source.sample(&resolved.name)?;
    Ok((resolved, baseline))
}

/// Initial transition: keep trying to capture a Baseline until it succeeds or
/// the operator quits. Returns `None` on quit/disconnect.
fn acquire_baseline<S: CounterSource>(
    source: &mut S,
    adapter: &mut String,
    config: &mut PollingConfig,
    commands: &Receiver<Command>,
    events: &Sender<MonitorEvent>,
) -> Option<AdapterSample> {
    let mut consecutive = 0u32;
    loop {
        match select_adapter(source, adapter) {
            Ok((resolved, baseline)) => {
                if resolved.name != *adapter || resolved.requested.is_some() {
                    *adapter = resolved.name.clone();
                    let _ = events.send(MonitorEvent::Selected {
                        adapter: resolved.name,
                        requested: resolved.requested,
                    });
                }
                return Some(baseline);
            }
            Err(err) => {
                consecutive += 1;
                warn!("baseline capture failed ({consecutive}): {err}");
                let _ = events.send(MonitorEvent::SampleFailed {
                    error: err.to_string(),
                    consecutive,
                });
                thread::sleep(Duration::from_secs_f64(config.interval_secs));
                loop {
                    match commands.try_recv() {
                        Ok(Command::Quit) | Err(TryRecvError::Disconnected) => return None,
                        Ok(Command::SetAdapter(name)) => *adapter = name,
                        Ok(Command::SetInterval(secs)) => {
                            if secs > 0.0 {
                                config.interval_secs = secs.max(MIN_INTERVAL_SECS);
                            }
                        }
                        Ok(_) => {}
                        Err(TryRecvError::Empty) => break,
                    }
                }
            }
        }
    }
}

fn report_failure(
    events: &Sender<MonitorEvent>,
    consecutive: &mut u32,
    degraded: &mut bool,
    err: &SourceError,
) {
    *consecutive += 1;
    warn!("sample read failed ({}): {err}", *consecutive);
    let _ = events.send(MonitorEvent::SampleFailed {
        error: err.to_string(),
        consecutive: *consecutive,
    });
    if *consecutive >= DEGRADED_AFTER_FAILURES && !*degraded {
        *degraded = true;
        let _ = events.send(MonitorEvent::Degraded(true));
    }
}

fn run_loop<S: CounterSource>(
    source: &mut S,
    mut config: PollingConfig,
    adapter: String,
    commands: &Receiver<Command>,
    events: &Sender<MonitorEvent>,
) {
    let mut adapter = adapter;
    let mut quit = false;
    let mut mark_pending = false;
    let mut consecutive_failures = 0u32;
    let mut degraded = false;

    let baseline = match acquire_baseline(source, &mut adapter, &mut config, commands, events) {
        Some(sample) => sample,
        None => return,
    };
    info!(
        "monitoring '{}' every {:.2}s",
        adapter, config.interval_secs
    );

    let mut sampler = Sampler::new(baseline.clone());
    let mut last_sample = baseline;

    loop {
        // Drain pending control commands, once per tick.
        loop {
            match commands.try_recv() {
                Ok(Command::Quit) => quit = true,
                Ok(Command::Mark) => mark_pending = true,
                Ok(Command::ClearInterim) => {
                    sampler.clear_interim();
                    info!("interim checkpoint cleared");
                }
                Ok(Command::SetInterval(secs)) => {
                    if secs > 0.0 {
                        config.interval_secs = secs.max(MIN_INTERVAL_SECS);
                        info!("polling interval set to {:.2}s", config.interval_secs);
                    }
                }
                Ok(Command::SetAdapter(name)) => match select_adapter(source, &name) {
                    Ok((resolved, fresh_baseline)) => {
                        adapter = resolved.name.clone();
                        sampler.rebase(fresh_baseline.clone());
                        last_sample = fresh_baseline;
                        consecutive_failures = 0;
                        info!("switched to adapter '{adapter}'");
                        let _ = events.send(MonitorEvent::Selected {
                            adapter: adapter.clone(),
                            requested: resolved.requested,
                        });
                    }
                    Err(err) => {
                        warn!("adapter switch to '{name}' failed: {err}");
                        let _ = events.send(MonitorEvent::SampleFailed {
                            error: err.to_string(),
                            consecutive: consecutive_failures,
                        });
                    }
                },
                Ok(Command::ListAdapters) => {
                    if let Ok(list) = source.list_adapters() {
                        let _ = events.send(MonitorEvent::Adapters(list));
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    quit = true;
                    break;
                }
            }
        }

        if quit {
            // End of session: Baseline to the latest sample, no further reads.
            let _ = events.send(MonitorEvent::Summary(sampler.summary(&last_sample)));
            info!("session ended");
            return;
        }

        // One tick: s1 strictly before the suspension, s2 after it. The rate
        // divides by the realized window between the two captures.
        let interval = config.interval_secs;
        let s1 = match source.sample(&adapter) {
            Ok(sample) => sample,
            Err(err) => {
                report_failure(events, &mut consecutive_failures, &mut degraded, &err);
                thread::sleep(Duration::from_secs_f64(interval));
                continue;
            }
        };

        thread::sleep(Duration::from_secs_f64(interval));

        let s2 = match source.sample(&adapter) {
            Ok(sample) => sample,
            Err(err) => {
                report_failure(events, &mut consecutive_failures, &mut degraded, &err);
                continue;
            }
        };

        consecutive_failures = 0;
        if degraded {
            degraded = false;
            let _ = events.send(MonitorEvent::Degraded(false));
        }

        let rate = RateSample::between(&s1, &s2, interval);
        let _ = events.send(MonitorEvent::Traffic(sampler.traffic_row(&s2, rate)));

        if mark_pending {
            mark_pending = false;
            let _ = events.send(MonitorEvent::Interim(sampler.mark(s2.clone())));
        }

        last_sample = s2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    const EPS: f64 = 1e-9;

    /// Scripted source: counters advance a fixed step on every read, and the
    /// shared `fail` counter makes the next N reads fail.
    struct MockSource {
        adapters: Vec<String>,
        rx: u64,
        tx: u64,
        rx_step: u64,
        tx_step: u64,
        fail: Arc<AtomicU32>,
    }

    impl MockSource {
        fn new(adapters: &[&str], rx_step: u64, tx_step: u64) -> (Self, Arc<AtomicU32>) {
            let fail = Arc::new(AtomicU32::new(0));
            let source = Self {
                adapters: adapters.iter().map(|s| s.to_string()).collect(),
                rx: 0,
                tx: 0,
                rx_step,
                tx_step,
                fail: Arc::clone(&fail),
            };
            (source, fail)
        }
    }

    impl CounterSource for MockSource {
        fn list_adapters(&mut self) -> Result<Vec<String>, SourceError> {
            if self.adapters.is_empty() {
                return Err(SourceError::NoAdaptersAvailable);
            }
            Ok(self.adapters.clone())
        }

        fn sample(&mut self, adapter: &str) -> Result<AdapterSample, SourceError> {
            if self
                .fail
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(SourceError::UnknownAdapter(adapter.to_string()));
            }
            if !self.adapters.iter().any(|a| a == adapter) {
                return Err(SourceError::UnknownAdapter(adapter.to_string()));
            }
            self.rx += self.rx_step;
            self.tx += self.tx_step;
            Ok(AdapterSample {
                bytes_received: self.rx,
                bytes_sent: self.tx,
                taken_at: Instant::now(),
                wall_time: Local::now(),
            })
        }
    }

    fn fast_config() -> PollingConfig {
        // Bypasses the interactive clamp; the core only requires > 0.
        PollingConfig {
            interval_secs: 0.01,
            logging_enabled: false,
        }
    }

    fn next_event(monitor: &Monitor) -> MonitorEvent {
        monitor
            .events()
            .recv_timeout(Duration::from_secs(5))
            .expect("monitor event")
    }

    fn next_traffic(monitor: &Monitor) -> TrafficRow {
        loop {
            if let MonitorEvent::Traffic(row) = next_event(monitor) {
                return row;
            }
        }
    }

    #[test]
    fn interval_steps_follow_the_quarter_second_policy() {
        let mut config = PollingConfig::new(0.25, false);
        config.increase_interval();
        assert!((config.interval_secs - 0.5).abs() < EPS);
        config.increase_interval();
        assert!((config.interval_secs - 0.75).abs() < EPS);
        config.increase_interval();
        assert!((config.interval_secs - 1.0).abs() < EPS);
        config.increase_interval();
        assert!((config.interval_secs - 2.0).abs() < EPS);

        config.decrease_interval();
        assert!((config.interval_secs - 1.0).abs() < EPS);
        config.decrease_interval();
        assert!((config.interval_secs - 0.75).abs() < EPS);
    }

    #[test]
    fn interval_never_drops_below_the_floor() {
        let mut config = PollingConfig::new(0.25, false);
        config.decrease_interval();
        assert!((config.interval_secs - MIN_INTERVAL_SECS).abs() < EPS);

        let clamped = PollingConfig::new(0.05, false);
        assert!((clamped.interval_secs - MIN_INTERVAL_SECS).abs() < EPS);
    }

    #[test]
    fn emits_traffic_rows_with_increasing_totals() {
        let (source, _fail) = MockSource::new(&["eth0"], 4096, 1024);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let mut prev = f64::MIN;
        for _ in 0..3 {
            let row = next_traffic(&monitor);
            assert!(row.total_in_mb >= prev);
            assert!(row.rate.in_mb_per_sec > 0.0);
            prev = row.total_in_mb;
        }

        monitor.send(Command::Quit);
        loop {
            match next_event(&monitor) {
                MonitorEvent::Summary(summary) => {
                    assert!(summary.in_mb > 0.0);
                    break;
                }
                _ => continue,
            }
        }
        monitor.join();
    }

    #[test]
    fn mark_emits_interim_row_measured_from_checkpoint() {
        let (source, _fail) = MockSource::new(&["eth0"], 1_048_576, 0);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let _ = next_traffic(&monitor);
        monitor.send(Command::Mark);

        let first = loop {
            if let MonitorEvent::Interim(row) = next_event(&monitor) {
                break row;
            }
        };
        // First mark measures from Baseline: every sample read adds 1 MiB.
        assert!(first.in_mb >= 2.0);

        monitor.send(Command::Mark);
        let second = loop {
            if let MonitorEvent::Interim(row) = next_event(&monitor) {
                break row;
            }
        };
        // Second mark measures from the first checkpoint, not Baseline: the
        // cumulative total keeps the whole session, the interim delta cannot.
        assert!(second.in_mb > 0.0);
        let row = next_traffic(&monitor);
        assert!(row.total_in_mb > second.in_mb);

        monitor.send(Command::Quit);
        monitor.join();
    }

    #[test]
    fn adapter_switch_rebases_cumulative_totals() {
        let (source, _fail) = MockSource::new(&["eth0", "wlan0"], 65_536, 0);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let mut before = 0.0;
        for _ in 0..4 {
            before = next_traffic(&monitor).total_in_mb;
        }

        monitor.send(Command::SetAdapter("wlan0".into()));
        loop {
            if let MonitorEvent::Selected { adapter, requested } = next_event(&monitor) {
                assert_eq!(adapter, "wlan0");
                assert!(requested.is_none());
                break;
            }
        }

        // Totals restart from the fresh baseline: at most s1+s2 worth of steps.
        let after = next_traffic(&monitor).total_in_mb;
        assert!(after < before);
        assert!(after <= to_mb_steps(65_536, 3));

        monitor.send(Command::Quit);
        monitor.join();
    }

    #[test]
    fn switch_to_unknown_adapter_falls_back_with_notice() {
        let (source, _fail) = MockSource::new(&["eth0", "wlan0"], 1024, 0);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let _ = next_traffic(&monitor);
        monitor.send(Command::SetAdapter("eth9".into()));

        loop {
            if let MonitorEvent::Selected { adapter, requested } = next_event(&monitor) {
                assert_eq!(adapter, "eth0");
                assert_eq!(requested.as_deref(), Some("eth9"));
                break;
            }
        }

        monitor.send(Command::Quit);
        monitor.join();
    }

    #[test]
    fn failed_samples_skip_rows_then_recover() {
        let (source, fail) = MockSource::new(&["eth0"], 2048, 0);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let before = next_traffic(&monitor).total_in_mb;
        fail.store(4, Ordering::SeqCst);

        // Rows captured before the streak may still be queued; sync on the
        // first failure before judging the recovery sequence.
        loop {
            if let MonitorEvent::SampleFailed { consecutive, .. } = next_event(&monitor) {
                assert!(consecutive >= 1);
                break;
            }
        }

        let mut saw_degraded = false;
        let mut saw_recovery = false;
        let after = loop {
            match next_event(&monitor) {
                MonitorEvent::SampleFailed { .. } => {}
                MonitorEvent::Degraded(flag) => {
                    if flag {
                        saw_degraded = true;
                    } else {
                        saw_recovery = true;
                    }
                }
                MonitorEvent::Traffic(row) => break row,
                _ => {}
            }
        };

        assert!(saw_degraded);
        // The recovery flag is emitted just before the first good row.
        assert!(saw_recovery);
        // Baseline survived the failures: totals kept growing, never reset.
        assert!(after.total_in_mb > before);

        monitor.send(Command::Quit);
        monitor.join();
    }

    #[test]
    fn quit_emits_exactly_one_summary_then_stops() {
        let (source, _fail) = MockSource::new(&["eth0"], 512, 512);
        let monitor = Monitor::spawn(source, fast_config(), "eth0".into()).unwrap();

        let _ = next_traffic(&monitor);
        monitor.send(Command::Quit);

        let mut summaries = 0;
        loop {
            match monitor.events().recv_timeout(Duration::from_secs(5)) {
                Ok(MonitorEvent::Summary(_)) => summaries += 1,
                Ok(_) => {}
                Err(_) => break, // worker exited, channel closed
            }
        }
        assert_eq!(summaries, 1);
        monitor.join();
    }

    fn to_mb_steps(step: u64, count: u64) -> f64 {
        (step * count) as f64 / 1024.0 / 1024.0
    }
}
