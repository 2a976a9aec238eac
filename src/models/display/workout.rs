//! Workout display model

use serde::Serialize;
use tabled::Tabled;

use crate::output::formatters::format_workout_date;
use crate::store::RecordView;

/// One row of `pitchside list --format table`
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct WorkoutDisplay {
    #[tabled(rename = "DATE")]
    pub date: String,

    #[tabled(rename = "WORKOUT")]
    pub summary: String,

    #[tabled(rename = "NOTES")]
    pub notes: String,

    #[tabled(rename = "ID")]
    pub id: String,
}

impl From<&RecordView> for WorkoutDisplay {
    fn from(view: &RecordView) -> Self {
        Self {
            date: format_workout_date(&view.date),
            summary: view.summary.clone(),
            notes: view.notes.clone().unwrap_or_default(),
            id: view.id.clone(),
        }
    }
}
