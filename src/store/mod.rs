//! Workout log backed by local key-value storage
//!
//! The in-memory list is the source of truth for a session. Every mutation
//! rewrites the whole list under one key; a failed write is reported but does
//! not undo the mutation.

pub mod export;
pub mod local;
pub mod model;
pub mod view;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result, StorageError, ValidationError};

pub use local::{KeyValueStore, LocalStorage};
pub use model::{Candidate, WorkoutRecord, WorkoutType};
pub use view::{ListView, RecordView, render};

/// Storage key holding the serialized list
pub const STORAGE_KEY: &str = "pitchside-workouts";

/// Result of a mutation: the re-rendered list and any persistence problem
#[derive(Debug)]
pub struct Change {
    pub view: ListView,
    /// Set when the new list could not be written; the change still applies
    /// for this session
    pub warning: Option<StorageError>,
}

/// Outcome of `add`
#[derive(Debug)]
pub struct Added {
    pub record: WorkoutRecord,
    pub change: Change,
}

/// Outcome of `remove`
#[derive(Debug)]
pub struct Removed {
    pub removed: bool,
    pub change: Change,
}

/// A CSV document ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub contents: String,
    pub records: usize,
}

/// Newest-first list of workouts persisted through a `KeyValueStore`
pub struct WorkoutStore<S: KeyValueStore> {
    storage: S,
    records: Vec<WorkoutRecord>,
}

impl<S: KeyValueStore> WorkoutStore<S> {
    /// Load the persisted list. Missing, unreadable or malformed data starts
    /// an empty list.
    pub fn load(storage: S) -> Self {
        let records = match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Discarding malformed workout data: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Failed to read workouts: {}", e);
                Vec::new()
            }
        };

        log::debug!("Loaded {} workouts", records.len());
        Self { storage, records }
    }

    /// All records, newest first
    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn view(&self) -> ListView {
        render(&self.records)
    }

    /// Validate and prepend a new record stamped with the current time
    pub fn add(&mut self, candidate: &Candidate) -> std::result::Result<Added, ValidationError> {
        self.add_at(candidate, Utc::now())
    }

    fn add_at(
        &mut self,
        candidate: &Candidate,
        now: DateTime<Utc>,
    ) -> std::result::Result<Added, ValidationError> {
        let valid = candidate.validate()?;

        let mut id = model::generate_id(now);
        while self.records.iter().any(|r| r.id == id) {
            id = model::generate_id(now);
        }

        let record = valid.into_record(id, now);
        log::debug!("Adding workout {}", record.id);
        self.records.insert(0, record.clone());

        Ok(Added {
            record,
            change: self.persist(),
        })
    }

    /// Drop the record with `id`. The list is persisted even if nothing matched.
    pub fn remove(&mut self, id: &str) -> Removed {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;

        if !removed {
            log::debug!("No workout with id {}", id);
        }

        Removed {
            removed,
            change: self.persist(),
        }
    }

    /// Build the CSV export of every record
    pub fn export(&self, now: DateTime<Utc>) -> Result<Export> {
        if self.records.is_empty() {
            return Err(Error::NothingToExport);
        }

        Ok(Export {
            filename: export::export_filename(now),
            contents: export::to_csv(&self.records),
            records: self.records.len(),
        })
    }

    fn persist(&self) -> Change {
        let warning = serde_json::to_string(&self.records)
            .map_err(|e| StorageError::Io(e.to_string()))
            .and_then(|json| self.storage.set_item(STORAGE_KEY, &json))
            .err();

        if let Some(e) = &warning {
            log::warn!("Failed to save workouts: {}", e);
        }

        Change {
            view: self.view(),
            warning,
        }
    }
}
