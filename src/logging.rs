//! Diagnostic logger setup.
//!
//! Both binaries log through the `log` facade. The console variant writes
//! timestamped records to stderr; the dashboard variant owns the terminal
//! with the alternate screen, so its diagnostics are routed to a file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Map a CLI log-level string to a filter
pub fn level_from_str(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Warn,
    }
}

/// Initialize the logger writing to stderr (console variant)
pub fn init_stderr(level: LevelFilter) {
    builder(level).init();
}

/// Initialize the logger writing to `path` (dashboard variant)
pub fn init_file(level: LevelFilter, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    builder(level).target(Target::Pipe(Box::new(file))).init();
    Ok(())
}

fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, level);
    // RUST_LOG still wins over the CLI flag
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings_map_case_insensitively() {
        assert_eq!(level_from_str("DEBUG"), LevelFilter::Debug);
        assert_eq!(level_from_str("off"), LevelFilter::Off);
        assert_eq!(level_from_str("bogus"), LevelFilter::Warn);
    }
}
