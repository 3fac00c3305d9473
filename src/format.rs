//! Shared formatting helpers: megabyte strings, durations, timestamps and
//! display-width-aware centering for the console table.

use chrono::{DateTime, Local};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Console table body width, without the timestamp column
pub const TABLE_BODY_WIDTH: usize = 57;

/// Width of the timestamp column. Sub-second intervals get two extra columns
/// for the centisecond suffix.
pub fn timestamp_width(interval_secs: f64) -> usize {
    if interval_secs < 1.0 {
        12
    } else {
        10
    }
}

/// Full console table width for the given polling interval
pub fn table_width(interval_secs: f64) -> usize {
    TABLE_BODY_WIDTH + timestamp_width(interval_secs)
}

/// Megabytes with two decimals
pub fn fmt_mb(value: f64) -> String {
    format!("{value:.2}")
}

/// Seconds as HH:MM:SS
pub fn fmt_duration(total_secs: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60
    )
}

/// Tick timestamp: HH:MM:SS, plus centiseconds when ticks are sub-second
pub fn tick_timestamp(at: &DateTime<Local>, interval_secs: f64) -> String {
    if interval_secs < 1.0 {
        format!(
            "{}:{:02}",
            at.format("%H:%M:%S"),
            at.timestamp_subsec_millis() / 10
        )
    } else {
        at.format("%H:%M:%S").to_string()
    }
}

/// Center `text` within `width` display columns, space-padded
pub fn center(text: &str, width: usize) -> String {
    center_with(text, width, ' ')
}

/// Center `text` within `width` display columns using `fill` padding.
/// Width is measured in terminal columns, not bytes or chars.
pub fn center_with(text: &str, width: usize, fill: char) -> String {
    let len = text.width();
    if len >= width {
        return text.to_string();
    }
    let pad = width - len;
    let left = pad / 2;
    let mut out = String::with_capacity(text.len() + pad);
    out.extend(std::iter::repeat(fill).take(left));
    out.push_str(text);
    out.extend(std::iter::repeat(fill).take(pad - left));
    out
}

/// Truncate to at most `max_width` display columns, appending an ellipsis
/// when anything was cut
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_with_fill_char() {
        assert_eq!(center_with("LOG START", 13, '*'), "**LOG START**");
        assert_eq!(center("ab", 6), "  ab  ");
        // Odd padding puts the extra column on the right
        assert_eq!(center("ab", 5), " ab  ");
    }

    #[test]
    fn center_is_width_aware_not_byte_aware() {
        // 'ü' is two bytes but one display column
        assert_eq!(center("ü", 3), " ü ");
    }

    #[test]
    fn over_long_text_passes_through() {
        assert_eq!(center("abcdef", 3), "abcdef");
    }

    #[test]
    fn duration_rolls_minutes_and_hours() {
        assert_eq!(fmt_duration(0), "00:00:00");
        assert_eq!(fmt_duration(61), "00:01:01");
        assert_eq!(fmt_duration(3 * 3600 + 25 * 60 + 9), "03:25:09");
    }

    #[test]
    fn sub_second_intervals_widen_the_timestamp_column() {
        assert_eq!(timestamp_width(0.25), 12);
        assert_eq!(timestamp_width(1.0), 10);
        assert_eq!(table_width(1.0), 67);
        assert_eq!(table_width(0.5), 69);
    }

    #[test]
    fn truncation_keeps_within_budget() {
        assert_eq!(truncate_to_width("Ethernet", 10), "Ethernet");
        let cut = truncate_to_width("a-very-long-adapter-name", 10);
        assert!(cut.ends_with('…'));
        assert!(cut.width() <= 10);
    }
}
