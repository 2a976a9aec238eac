//! Dynamic shell completions for pitchside
//!
//! Completes workout IDs from the local workout list and workout types from
//! the built-in set.
//!
//! Shell support:
//! - Fish/Zsh: Full support with descriptions
//! - Bash: Values only (no description display)

use clap_complete::engine::{ArgValueCandidates, CompletionCandidate};

use crate::config::Config;
use crate::output::formatters::format_workout_date;
use crate::store::{LocalStorage, WorkoutStore, WorkoutType};

/// Maximum number of completion candidates to return
const MAX_COMPLETIONS: usize = 25;

/// Open the workout list the same way commands do, honoring the env
/// overrides. Completions never break the shell, so every error yields None.
fn completion_store() -> Option<WorkoutStore<LocalStorage>> {
    let config_path = std::env::var("PITCHSIDE_CONFIG").ok();
    let data_dir = std::env::var("PITCHSIDE_DATA_DIR").ok();

    let config = Config::load_at(config_path.as_deref()).ok()?;
    let dir = config.resolve_data_dir(data_dir.as_deref()).ok()?;
    if !dir.exists() {
        return None;
    }

    let storage = LocalStorage::open_at(&dir, config.storage_quota_bytes).ok()?;
    Some(WorkoutStore::load(storage))
}

/// Complete workout IDs, newest first.
///
/// Format: `{id}` with help `{summary} | {date}`
pub fn complete_workout_ids() -> Vec<CompletionCandidate> {
    let Some(store) = completion_store() else {
        return vec![];
    };

    store
        .records()
        .iter()
        .take(MAX_COMPLETIONS)
        .map(|record| {
            let help = format!("{} | {}", record.summary(), format_workout_date(&record.date));
            CompletionCandidate::new(record.id.clone()).help(Some(help.into()))
        })
        .collect()
}

/// Complete the built-in workout types with their labels
pub fn complete_workout_types() -> Vec<CompletionCandidate> {
    WorkoutType::KNOWN
        .iter()
        .map(|kind| {
            CompletionCandidate::new(kind.as_str().to_string()).help(Some(kind.to_string().into()))
        })
        .collect()
}

/// Create completion candidates for workout IDs.
pub fn workout_id_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_workout_ids)
}

/// Create completion candidates for workout types.
pub fn workout_type_candidates() -> ArgValueCandidates {
    ArgValueCandidates::new(complete_workout_types)
}
