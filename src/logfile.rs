//! Append-only session log.
//!
//! One file per session, named after the session start time. The banner and
//! the column header are written on the first append; every tick after that
//! adds one tab-separated record. The file is opened in append mode for each
//! write so a crash never loses buffered rows.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::format::{center_with, fmt_mb, table_width, tick_timestamp};
use crate::net::sampler::TrafficRow;

/// Column header, tab-separated to match the data rows
pub const LOG_HEADER: &str = "TIMESTAMP\tIN [MB/s]\tOUT [MB/s]\tTOTAL IN [MB]\tTOTAL OUT [MB]";

pub struct SessionLog {
    path: PathBuf,
    interval_secs: f64,
    banner_width: usize,
    started: bool,
}

impl SessionLog {
    /// Session log in the working directory, stamped with the current time.
    pub fn new(interval_secs: f64) -> Self {
        Self::in_dir(Path::new("."), interval_secs)
    }

    pub fn in_dir(dir: &Path, interval_secs: f64) -> Self {
        let name = Local::now()
            .format("network_traffic_%y-%m-%d_%H-%M-%S.log")
            .to_string();
        Self {
            path: dir.join(name),
            interval_secs,
            banner_width: table_width(interval_secs),
            started: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one tick record, writing the banner and header first if this is
    /// the session's first write.
    pub fn append_row(&mut self, row: &TrafficRow) -> io::Result<()> {
        let mut file = self.open()?;
        writeln!(
            file,
            "{}\t{}\t{}\t{}\t{}",
            tick_timestamp(&row.wall_time, self.interval_secs),
            fmt_mb(row.rate.in_mb_per_sec),
            fmt_mb(row.rate.out_mb_per_sec),
            fmt_mb(row.total_in_mb),
            fmt_mb(row.total_out_mb),
        )
    }

    fn open(&mut self) -> io::Result<File> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if !self.started {
            writeln!(file, "{}", center_with("LOG START", self.banner_width, '*'))?;
            writeln!(file, "{LOG_HEADER}")?;
            self.started = true;
        }
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::sampler::RateSample;

    fn row(in_rate: f64, total_in: f64) -> TrafficRow {
        TrafficRow {
            wall_time: Local::now(),
            rate: RateSample {
                window_secs: 1.0,
                in_mb_per_sec: in_rate,
                out_mb_per_sec: 0.25,
            },
            total_in_mb: total_in,
            total_out_mb: 0.5,
        }
    }

    #[test]
    fn banner_and_header_are_written_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::in_dir(dir.path(), 1.0);

        log.append_row(&row(1.5, 10.0)).unwrap();
        log.append_row(&row(2.0, 12.0)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("LOG START"));
        assert!(lines[0].starts_with('*'));
        assert_eq!(lines[1], LOG_HEADER);
        assert_eq!(content.matches("LOG START").count(), 1);
    }

    #[test]
    fn data_rows_are_tab_separated_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::in_dir(dir.path(), 1.0);
        log.append_row(&row(1.5, 10.0)).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let data = content.lines().nth(2).unwrap();
        let fields: Vec<&str> = data.split('\t').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], "1.50");
        assert_eq!(fields[2], "0.25");
        assert_eq!(fields[3], "10.00");
        assert_eq!(fields[4], "0.50");
    }

    #[test]
    fn filename_follows_the_session_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::in_dir(dir.path(), 0.5);
        let name = log.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("network_traffic_"));
        assert!(name.ends_with(".log"));
    }
}
