//! Session statistics model.
//!
//! Holds the Baseline (session start) and the optional interim checkpoint,
//! and derives rates, cumulative totals, interim deltas and the end-of-session
//! summary from pairs of [`AdapterSample`]s. Pure arithmetic — no I/O, no
//! clocks of its own — so the whole model is exercised directly in tests.

use chrono::{DateTime, Local};

use crate::net::source::AdapterSample;

/// Bytes to binary megabytes
pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Throughput over one tick window, derived from two consecutive samples
#[derive(Debug, Clone, Copy)]
pub struct RateSample {
    /// Realized window length in seconds (wall clock, not the configured interval)
    pub window_secs: f64,
    pub in_mb_per_sec: f64,
    pub out_mb_per_sec: f64,
}

impl RateSample {
    /// Compute the rate between two consecutive samples.
    ///
    /// The realized elapsed time between the captures is used for the
    /// division; `configured_interval` is the fallback only when the
    /// monotonic delta comes out non-positive.
    pub fn between(s1: &AdapterSample, s2: &AdapterSample, configured_interval: f64) -> Self {
        let realized = s2.taken_at.duration_since(s1.taken_at).as_secs_f64();
        let window_secs = if realized > 0.0 {
            realized
        } else {
            configured_interval
        };

        RateSample {
            window_secs,
            in_mb_per_sec: to_mb(s2.bytes_received.saturating_sub(s1.bytes_received)) / window_secs,
            out_mb_per_sec: to_mb(s2.bytes_sent.saturating_sub(s1.bytes_sent)) / window_secs,
        }
    }
}

/// One display row per tick, emitted to the presentation sinks
#[derive(Debug, Clone)]
pub struct TrafficRow {
    pub wall_time: DateTime<Local>,
    pub rate: RateSample,
    /// Cumulative MB received since the session Baseline
    pub total_in_mb: f64,
    /// Cumulative MB sent since the session Baseline
    pub total_out_mb: f64,
}

/// "Since last mark" statistics, emitted when the operator sets a checkpoint
#[derive(Debug, Clone)]
pub struct InterimRow {
    pub wall_time: DateTime<Local>,
    pub elapsed_secs: f64,
    pub in_mb: f64,
    pub out_mb: f64,
}

/// End-of-session statistics, Baseline to final sample
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub elapsed_secs: u64,
    pub in_mb: f64,
    pub out_mb: f64,
}

/// Baseline + interim checkpoint for the active adapter selection.
///
/// The monitor worker owns exactly one of these per adapter selection;
/// switching adapters replaces it wholesale via [`Sampler::rebase`].
#[derive(Debug)]
pub struct Sampler {
    baseline: AdapterSample,
    interim: Option<AdapterSample>,
}

impl Sampler {
    pub fn new(baseline: AdapterSample) -> Self {
        Self {
            baseline,
            interim: None,
        }
    }

    pub fn baseline(&self) -> &AdapterSample {
        &self.baseline
    }

    /// Fresh initial transition: new Baseline, interim checkpoint cleared.
    pub fn rebase(&mut self, baseline: AdapterSample) {
        self.baseline = baseline;
        self.interim = None;
    }

    /// Drop the interim checkpoint; the next mark measures from Baseline.
    pub fn clear_interim(&mut self) {
        self.interim = None;
    }

    /// Build the per-tick display row from the tick's closing sample.
    pub fn traffic_row(&self, s2: &AdapterSample, rate: RateSample) -> TrafficRow {
        TrafficRow {
            wall_time: s2.wall_time,
            rate,
            total_in_mb: to_mb(s2.bytes_received) - to_mb(self.baseline.bytes_received),
            total_out_mb: to_mb(s2.bytes_sent) - to_mb(self.baseline.bytes_sent),
        }
    }

    /// Record an interim checkpoint at `at`.
    ///
    /// The returned row measures elapsed time and byte deltas since the
    /// previous checkpoint (Baseline when none was set); `at` then becomes
    /// the new checkpoint.
    pub fn mark(&mut self, at: AdapterSample) -> InterimRow {
        let reference = self.interim.as_ref().unwrap_or(&self.baseline);
        let row = InterimRow {
            wall_time: at.wall_time,
            elapsed_secs: at.taken_at.duration_since(reference.taken_at).as_secs_f64(),
            in_mb: to_mb(at.bytes_received.saturating_sub(reference.bytes_received)),
            out_mb: to_mb(at.bytes_sent.saturating_sub(reference.bytes_sent)),
        };
        self.interim = Some(at);
        row
    }

    /// End-of-session statistics against Baseline. Does not consume the
    /// sampler so the caller can still render the last state.
    pub fn summary(&self, last: &AdapterSample) -> SessionSummary {
        SessionSummary {
            elapsed_secs: last.taken_at.duration_since(self.baseline.taken_at).as_secs(),
            in_mb: to_mb(last.bytes_received.saturating_sub(self.baseline.bytes_received)),
            out_mb: to_mb(last.bytes_sent.saturating_sub(self.baseline.bytes_sent)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const EPS: f64 = 1e-9;

    fn sample(base: Instant, offset_secs: f64, rx: u64, tx: u64) -> AdapterSample {
        AdapterSample {
            bytes_received: rx,
            bytes_sent: tx,
            taken_at: base + Duration::from_secs_f64(offset_secs),
            wall_time: Local::now(),
        }
    }

    #[test]
    fn rate_divides_delta_by_realized_window() {
        let base = Instant::now();
        // 1 MiB received over exactly 1 second
        let s1 = sample(base, 0.0, 0, 0);
        let s2 = sample(base, 1.0, 1_048_576, 524_288);

        let rate = RateSample::between(&s1, &s2, 0.25);
        assert!((rate.window_secs - 1.0).abs() < EPS);
        assert!((rate.in_mb_per_sec - 1.0).abs() < EPS);
        assert!((rate.out_mb_per_sec - 0.5).abs() < EPS);
    }

    #[test]
    fn rate_uses_realized_time_not_configured_interval() {
        let base = Instant::now();
        // configured for 1s, but the tick actually took 2s
        let s1 = sample(base, 0.0, 0, 0);
        let s2 = sample(base, 2.0, 2_097_152, 0);

        let rate = RateSample::between(&s1, &s2, 1.0);
        assert!((rate.in_mb_per_sec - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_window_falls_back_to_configured_interval() {
        let base = Instant::now();
        let s1 = sample(base, 0.0, 0, 0);
        let s2 = sample(base, 0.0, 1_048_576, 0);

        let rate = RateSample::between(&s1, &s2, 0.5);
        assert!((rate.window_secs - 0.5).abs() < EPS);
        assert!((rate.in_mb_per_sec - 2.0).abs() < EPS);
    }

    #[test]
    fn counter_reset_clamps_to_zero_rate() {
        let base = Instant::now();
        let s1 = sample(base, 0.0, 5_000_000, 5_000_000);
        let s2 = sample(base, 1.0, 1_000, 1_000);

        let rate = RateSample::between(&s1, &s2, 1.0);
        assert_eq!(rate.in_mb_per_sec, 0.0);
        assert_eq!(rate.out_mb_per_sec, 0.0);
    }

    #[test]
    fn documented_example_scenario() {
        // Baseline rx=1,000,000 at t=0; one second later rx=2,097,152.
        let base = Instant::now();
        let baseline = sample(base, 0.0, 1_000_000, 500_000);
        let s2 = sample(base, 1.0, 2_097_152, 500_000);

        let rate = RateSample::between(&baseline, &s2, 1.0);
        let expected = (2_097_152.0 - 1_000_000.0) / 1024.0 / 1024.0;
        assert!((rate.in_mb_per_sec - expected).abs() < 1e-6);
        assert_eq!(rate.out_mb_per_sec, 0.0);

        let sampler = Sampler::new(baseline);
        let row = sampler.traffic_row(&s2, rate);
        assert!((row.total_in_mb - expected).abs() < 1e-6); // ≈ 1.05 MB
        assert!(row.total_out_mb.abs() < EPS);
    }

    #[test]
    fn totals_are_monotonic_for_fixed_baseline() {
        let base = Instant::now();
        let sampler = Sampler::new(sample(base, 0.0, 1_000, 2_000));

        let mut prev_in = f64::MIN;
        let mut prev_out = f64::MIN;
        for tick in 1..=5u64 {
            let s2 = sample(base, tick as f64, 1_000 + tick * 10_000, 2_000 + tick * 5_000);
            let rate = RateSample::between(sampler.baseline(), &s2, 1.0);
            let row = sampler.traffic_row(&s2, rate);
            assert!(row.total_in_mb >= prev_in);
            assert!(row.total_out_mb >= prev_out);
            prev_in = row.total_in_mb;
            prev_out = row.total_out_mb;
        }
    }

    #[test]
    fn rebase_resets_totals_and_clears_interim() {
        let base = Instant::now();
        let mut sampler = Sampler::new(sample(base, 0.0, 0, 0));
        sampler.mark(sample(base, 1.0, 10_485_760, 0));

        // Adapter switch: new baseline on the new adapter's counters
        let new_baseline = sample(base, 2.0, 99_000_000, 44_000_000);
        sampler.rebase(new_baseline);

        let s2 = sample(base, 3.0, 99_000_512, 44_000_256);
        let rate = RateSample::between(sampler.baseline(), &s2, 1.0);
        let row = sampler.traffic_row(&s2, rate);
        assert!(row.total_in_mb < 0.001);
        assert!(row.total_out_mb < 0.001);

        // Interim was cleared: the next mark measures from the new baseline
        let interim = sampler.mark(s2);
        assert!((interim.elapsed_secs - 1.0).abs() < EPS);
        assert!((interim.in_mb - to_mb(512)).abs() < EPS);
    }

    #[test]
    fn mark_measures_from_previous_mark_not_baseline() {
        let base = Instant::now();
        let mut sampler = Sampler::new(sample(base, 0.0, 0, 0));

        let first = sampler.mark(sample(base, 10.0, 10_485_760, 1_048_576));
        assert!((first.elapsed_secs - 10.0).abs() < EPS);
        assert!((first.in_mb - 10.0).abs() < EPS);
        assert!((first.out_mb - 1.0).abs() < EPS);

        // Immediately re-marking yields ≈ 0
        let immediate = sampler.mark(sample(base, 10.0, 10_485_760, 1_048_576));
        assert!(immediate.elapsed_secs.abs() < EPS);
        assert!(immediate.in_mb.abs() < EPS);

        // Later marks are independent of Baseline
        let later = sampler.mark(sample(base, 15.0, 11_534_336, 1_048_576));
        assert!((later.elapsed_secs - 5.0).abs() < EPS);
        assert!((later.in_mb - 1.0).abs() < EPS);
        assert!(later.out_mb.abs() < EPS);
    }

    #[test]
    fn clear_interim_restores_baseline_reference() {
        let base = Instant::now();
        let mut sampler = Sampler::new(sample(base, 0.0, 0, 0));
        sampler.mark(sample(base, 5.0, 5_242_880, 0));
        sampler.clear_interim();

        let row = sampler.mark(sample(base, 8.0, 8_388_608, 0));
        assert!((row.elapsed_secs - 8.0).abs() < EPS);
        assert!((row.in_mb - 8.0).abs() < EPS);
    }

    #[test]
    fn summary_measures_baseline_to_last_sample() {
        let base = Instant::now();
        let mut sampler = Sampler::new(sample(base, 0.0, 1_048_576, 0));
        // Marks must not affect the session summary
        sampler.mark(sample(base, 30.0, 52_428_800, 1_048_576));

        let last = sample(base, 90.0, 105_906_176, 2_097_152);
        let summary = sampler.summary(&last);
        assert_eq!(summary.elapsed_secs, 90);
        assert!((summary.in_mb - 100.0).abs() < EPS);
        assert!((summary.out_mb - 2.0).abs() < EPS);
    }
}
