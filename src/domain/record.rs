/// CompletionRecord entity for tracking habit completions
///
/// A record says whether a habit was completed on one calendar date. There is
/// at most one record per (habit, date); the storage layer enforces that.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HabitId, RecordId};

/// Whether a habit was completed on a specific day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: RecordId,
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// Calendar day the record covers (no time component)
    pub date: NaiveDate,
    pub completed: bool,
    /// When the habit was marked done; `None` unless `completed`
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletionRecord {
    /// Create a record, stamping `completed_at` with the current time when completed
    pub fn new(habit_id: HabitId, date: NaiveDate, completed: bool) -> Self {
        Self {
            id: RecordId::new(),
            habit_id,
            date,
            completed,
            completed_at: completed.then(Utc::now),
        }
    }

    /// An open record for a day nobody has marked yet
    pub fn incomplete(habit_id: HabitId, date: NaiveDate) -> Self {
        Self::new(habit_id, date, false)
    }

    /// Create a record from existing data (used when loading from database)
    pub fn from_existing(
        id: RecordId,
        habit_id: HabitId,
        date: NaiveDate,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            habit_id,
            date,
            completed,
            completed_at,
        }
    }
}
