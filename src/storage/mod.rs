/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and completion records.

pub mod migrations;
pub mod sqlite;

// Re-export the main storage types
pub use sqlite::*;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::domain::{CompletionRecord, Habit, HabitId, StreakSummary};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Duplicate record: habit {habit_id} already has a record for {date}")]
    DuplicateRecord { habit_id: String, date: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for habits and their completion log
///
/// Handlers and the daily reset job only talk to the store through this
/// trait, so tests can run everything against an in-memory database.
pub trait HabitStorage {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// Update an existing habit's editable fields (not its streaks)
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Delete a habit together with all of its completion records
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Persist a freshly calculated streak pair on a habit
    fn update_streaks(
        &self,
        habit_id: &HabitId,
        streaks: &StreakSummary,
    ) -> Result<(), StorageError>;

    /// Insert or overwrite the record for (habit, date) and return it
    fn upsert_record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<CompletionRecord, StorageError>;

    /// Get the record for (habit, date), if one exists
    fn get_record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, StorageError>;

    /// Insert a new record; fails with `DuplicateRecord` if (habit, date) is taken
    fn create_record(&self, record: &CompletionRecord) -> Result<(), StorageError>;

    /// Records whose date lies in the inclusive range, or every record when
    /// no range is given
    fn list_records(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<CompletionRecord>, StorageError>;

    /// Dates on which a habit was marked completed, most recent first
    fn completed_dates(&self, habit_id: &HabitId) -> Result<Vec<NaiveDate>, StorageError>;

    /// Does a record exist for (habit, date)?
    fn record_exists(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        Ok(self.get_record(habit_id, date)?.is_some())
    }

    /// Create an incomplete record for (habit, date) unless one already exists
    ///
    /// Returns `true` when a record was created. A uniqueness conflict from a
    /// concurrent writer counts as "already exists".
    fn ensure_record(&self, habit_id: &HabitId, date: NaiveDate) -> Result<bool, StorageError> {
        if self.record_exists(habit_id, date)? {
            return Ok(false);
        }

        match self.create_record(&CompletionRecord::incomplete(habit_id.clone(), date)) {
            Ok(()) => Ok(true),
            Err(StorageError::DuplicateRecord { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
