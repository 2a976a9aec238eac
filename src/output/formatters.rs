//! Reusable formatting utilities for CLI output

use chrono::{DateTime, Local, Utc};

/// Format a workout date in local time.
///
/// # Example output
/// `Mar 5, 06:30 PM`
pub fn format_workout_date(date: &DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%b %-d, %I:%M %p")
        .to_string()
}

/// Format a Unix timestamp (seconds) as a local date/time.
///
/// Returns "unknown" for out-of-range values.
pub fn format_timestamp_local(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|d| d.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Format bytes as human-readable size
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;
    const GB: usize = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
