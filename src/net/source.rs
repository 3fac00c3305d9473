//! Adapter byte-counter access.
//!
//! Everything the engine knows about the operating system goes through the
//! [`CounterSource`] trait: list the adapter names that currently exist, and
//! read the cumulative RX/TX byte counters for one of them. The production
//! implementation sits on top of `sysinfo::Networks`; tests substitute
//! scripted sources.

use std::time::Instant;

use chrono::{DateTime, Local};
use sysinfo::Networks;
use thiserror::Error;

/// Errors surfaced by a counter source
#[derive(Debug, Error)]
pub enum SourceError {
    /// The OS reports no network adapters at all
    #[error("no network adapters available")]
    NoAdaptersAvailable,

    /// The named adapter is not currently present (disabled, unplugged, renamed)
    #[error("unknown network adapter '{0}'")]
    UnknownAdapter(String),
}

/// One reading of an adapter's cumulative byte counters.
///
/// Counters are monotonic within a boot cycle; `taken_at` is the monotonic
/// capture instant used for rate windows, `wall_time` is what gets displayed.
#[derive(Debug, Clone)]
pub struct AdapterSample {
    pub bytes_received: u64,
    pub bytes_sent: u64,
    pub taken_at: Instant,
    pub wall_time: DateTime<Local>,
}

/// Capability interface over the OS network statistics
pub trait CounterSource {
    /// Names of the adapters currently present, sorted. Errors when empty.
    fn list_adapters(&mut self) -> Result<Vec<String>, SourceError>;

    /// Read the cumulative counters for one adapter.
    fn sample(&mut self, adapter: &str) -> Result<AdapterSample, SourceError>;
}

/// Production source backed by the `sysinfo` crate
pub struct SysinfoSource {
    networks: Networks,
}

impl SysinfoSource {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoSource {
    fn list_adapters(&mut self) -> Result<Vec<String>, SourceError> {
        // true = drop adapters that disappeared since the last refresh
        self.networks.refresh(true);

        let mut names: Vec<String> = self.networks.iter().map(|(name, _)| name.clone()).collect();
        names.sort();

        if names.is_empty() {
            return Err(SourceError::NoAdaptersAvailable);
        }
        Ok(names)
    }

    fn sample(&mut self, adapter: &str) -> Result<AdapterSample, SourceError> {
        self.networks.refresh(true);

        let data = self
            .networks
            .iter()
            .find(|(name, _)| name.as_str() == adapter)
            .map(|(_, data)| data)
            .ok_or_else(|| SourceError::UnknownAdapter(adapter.to_string()))?;

        Ok(AdapterSample {
            bytes_received: data.total_received(),
            bytes_sent: data.total_transmitted(),
            taken_at: Instant::now(),
            wall_time: Local::now(),
        })
    }
}

/// Adapter-name prefixes that identify real network devices, tried in order
/// when the requested name is absent. Covers Linux predictable names, BSD/mac
/// and the Windows friendly names.
const PLATFORM_PREFIXES: &[&str] = &["eth", "en", "wl", "Ethernet", "Wi-Fi", "WiFi"];

/// Outcome of resolving a requested adapter name against the available set.
///
/// `requested` is `Some` exactly when a fallback was substituted for a name
/// the operator asked for; the notice is shown once per resolution.
#[derive(Debug, Clone)]
pub struct ResolvedAdapter {
    pub name: String,
    pub requested: Option<String>,
}

/// Resolve an (optional) requested adapter name against the available set.
///
/// Exact match wins. Otherwise the first adapter with a platform network
/// prefix is chosen, then the first available name. `available` must be
/// non-empty.
pub fn resolve_adapter(
    requested: Option<&str>,
    available: &[String],
) -> Result<ResolvedAdapter, SourceError> {
    if available.is_empty() {
        return Err(SourceError::NoAdaptersAvailable);
    }

    if let Some(want) = requested {
        if available.iter().any(|name| name == want) {
            return Ok(ResolvedAdapter {
                name: want.to_string(),
                requested: None,
            });
        }
    }

    let fallback = available
        .iter()
        .find(|name| PLATFORM_PREFIXES.iter().any(|p| name.starts_with(p)))
        .unwrap_or(&available[0])
        .clone();

    Ok(ResolvedAdapter {
        name: fallback,
        requested: requested.map(str::to_string),
    })
}
