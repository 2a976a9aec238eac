//! Rendering of the workout list into a display snapshot

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::model::WorkoutRecord;

/// Records shown at once; the rest are kept but hidden
pub const VISIBLE_LIMIT: usize = 10;

/// Notes longer than this are cut and suffixed with `...`
pub const NOTES_PREVIEW_CHARS: usize = 30;

/// Display snapshot of the list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub items: Vec<RecordView>,
    pub total: usize,
    pub hidden: usize,
}

impl ListView {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// One rendered record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub id: String,
    pub date: DateTime<Utc>,
    pub summary: String,
    /// Truncated notes; absent when the record has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Render the newest records. Pure; the same list always renders the same view.
pub fn render(records: &[WorkoutRecord]) -> ListView {
    let items = records
        .iter()
        .take(VISIBLE_LIMIT)
        .map(|record| RecordView {
            id: record.id.clone(),
            date: record.date,
            summary: record.summary(),
            notes: preview_notes(&record.notes),
        })
        .collect();

    ListView {
        items,
        total: records.len(),
        hidden: records.len().saturating_sub(VISIBLE_LIMIT),
    }
}

fn preview_notes(notes: &str) -> Option<String> {
    if notes.is_empty() {
        return None;
    }
    if notes.chars().count() > NOTES_PREVIEW_CHARS {
        let cut: String = notes.chars().take(NOTES_PREVIEW_CHARS).collect();
        Some(format!("{}...", cut))
    } else {
        Some(notes.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::model::WorkoutType;

    fn record(n: usize, notes: &str) -> WorkoutRecord {
        WorkoutRecord {
            id: format!("workout_{}", n),
            kind: WorkoutType::Cardio,
            duration: 30,
            intensity: 7,
            notes: notes.to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_empty_list() {
        let view = render(&[]);
        assert!(view.is_empty());
        assert!(view.items.is_empty());
        assert_eq!(view.hidden, 0);
    }

    #[test]
    fn test_shows_first_ten_in_order() {
        let records: Vec<_> = (0..12).map(|n| record(n, "")).collect();
        let view = render(&records);

        assert_eq!(view.items.len(), 10);
        assert_eq!(view.total, 12);
        assert_eq!(view.hidden, 2);
        assert_eq!(view.items[0].id, "workout_0");
        assert_eq!(view.items[9].id, "workout_9");
    }

    #[test]
    fn test_notes_preview() {
        let long = "a".repeat(31);
        let exact = "b".repeat(30);
        let view = render(&[record(0, &long), record(1, &exact), record(2, "")]);

        assert_eq!(view.items[0].notes, Some(format!("{}...", "a".repeat(30))));
        assert_eq!(view.items[1].notes, Some(exact));
        assert_eq!(view.items[2].notes, None);
    }

    #[test]
    fn test_notes_preview_counts_characters() {
        let notes = "⚽".repeat(31);
        let view = render(&[record(0, &notes)]);
        assert_eq!(
            view.items[0].notes.as_deref(),
            Some(format!("{}...", "⚽".repeat(30)).as_str())
        );
    }

    #[test]
    fn test_render_is_pure() {
        let records = vec![record(0, "x"), record(1, "y")];
        assert_eq!(render(&records), render(&records));
    }
}
