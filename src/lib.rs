//! nettop — a network throughput monitor, written in Rust.
//!
//! One engine, two front-ends:
//!   - `nettop`: full-screen dashboard with live rate meters, rate history
//!     charts, an interim-marks table, adapter picker and help overlay
//!   - `netmon`: plain console variant with hotkeys and a `\r`-overwritten
//!     status line, suited to narrow terminals and log piping
//!
//! The engine samples cumulative per-adapter byte counters on a dedicated
//! worker thread, computes delta-over-time rates and cumulative totals, and
//! emits immutable display rows over a channel.

pub mod app;
pub mod format;
pub mod input;
pub mod logfile;
pub mod logging;
pub mod net;
pub mod ui;
