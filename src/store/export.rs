//! CSV export of the workout list

use chrono::{DateTime, Utc};

use super::model::WorkoutRecord;

const HEADER: &str = "Date,Type,Duration (min),Intensity,Notes";

/// `pitchside-workouts-<YYYY-MM-DD>.csv` for the given day
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("pitchside-workouts-{}.csv", now.format("%Y-%m-%d"))
}

/// One header line plus one row per record, joined with `\n`.
/// Notes are always quoted with embedded quotes doubled; the type is quoted
/// only when it needs to be.
pub fn to_csv(records: &[WorkoutRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(HEADER.to_string());

    for record in records {
        lines.push(format!(
            "{},{},{},{},\"{}\"",
            record.date.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            type_field(record.kind.label()),
            record.duration,
            record.intensity,
            record.notes.replace('"', "\"\"")
        ));
    }

    lines.join("\n")
}

/// Free-form types are user text. Line breaks would split the row, so they
/// become spaces; commas and quotes get the same quoting as notes.
fn type_field(label: &str) -> String {
    let flat: String = label
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if flat.contains([',', '"']) {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}
