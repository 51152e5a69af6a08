/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a user's habit
/// they want to track, along with its validation rules.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Frequency, HabitId, TimeOfDay};

/// A habit represents something the user wants to do regularly
///
/// The streak counters are a cache of the last streak calculation over the
/// habit's completion history. They are only ever written together through
/// [`HabitStorage::update_streaks`](crate::storage::HabitStorage::update_streaks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run", "Read for 30min")
    pub name: String,
    /// Part of the day the habit belongs to
    pub time_of_day: TimeOfDay,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// Selected weekdays for weekly habits (0 = Sunday .. 6 = Saturday)
    pub week_days: Vec<u8>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Reminder settings are stored but never dispatched
    pub reminder_enabled: bool,
    pub reminder_time: Option<String>,
}

/// A set of optional changes to apply to a habit
///
/// `reminder_time` is doubly optional so that a caller can distinguish
/// "leave unchanged" (`None`) from "clear it" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub time_of_day: Option<TimeOfDay>,
    pub frequency: Option<Frequency>,
    pub week_days: Option<Vec<u8>>,
    pub reminder_enabled: Option<bool>,
    pub reminder_time: Option<Option<String>>,
}

impl Habit {
    /// Create a new habit with validation
    ///
    /// Streak counters start at zero and the creation time is set to now.
    pub fn new(
        name: String,
        time_of_day: TimeOfDay,
        frequency: Frequency,
        week_days: Vec<u8>,
        reminder_enabled: bool,
        reminder_time: Option<String>,
    ) -> Result<Self, DomainError> {
        let name = Self::validate_name(&name)?;
        let week_days = Self::normalize_week_days(week_days)?;
        let reminder_time = Self::validate_reminder_time(reminder_time)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            time_of_day,
            frequency,
            week_days,
            created_at: Utc::now(),
            current_streak: 0,
            longest_streak: 0,
            reminder_enabled,
            reminder_time,
        })
    }

    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: HabitId,
        name: String,
        time_of_day: TimeOfDay,
        frequency: Frequency,
        week_days: Vec<u8>,
        created_at: DateTime<Utc>,
        current_streak: u32,
        longest_streak: u32,
        reminder_enabled: bool,
        reminder_time: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            time_of_day,
            frequency,
            week_days,
            created_at,
            current_streak,
            longest_streak,
            reminder_enabled,
            reminder_time,
        }
    }

    /// Update the habit's properties with validation
    ///
    /// Every change is validated before any of them is applied, so a failed
    /// update leaves the habit untouched.
    pub fn update(&mut self, changes: HabitChanges) -> Result<(), DomainError> {
        let name = changes
            .name
            .as_deref()
            .map(Self::validate_name)
            .transpose()?;
        let week_days = changes
            .week_days
            .map(Self::normalize_week_days)
            .transpose()?;
        let reminder_time = changes
            .reminder_time
            .map(Self::validate_reminder_time)
            .transpose()?;

        if let Some(new_name) = name {
            self.name = new_name;
        }
        if let Some(new_time_of_day) = changes.time_of_day {
            self.time_of_day = new_time_of_day;
        }
        if let Some(new_frequency) = changes.frequency {
            self.frequency = new_frequency;
        }
        if let Some(new_week_days) = week_days {
            self.week_days = new_week_days;
        }
        if let Some(new_enabled) = changes.reminder_enabled {
            self.reminder_enabled = new_enabled;
        }
        if let Some(new_time) = reminder_time {
            self.reminder_time = new_time;
        }

        Ok(())
    }

    /// Whether the habit is expected to be done on `date`
    pub fn is_scheduled_for(&self, date: NaiveDate) -> bool {
        self.frequency.is_scheduled_for_date(&self.week_days, date)
    }

    // Validation helper methods

    /// Validate habit name and return it trimmed
    fn validate_name(name: &str) -> Result<String, DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string(),
            ));
        }

        if trimmed.chars().count() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string(),
            ));
        }

        Ok(trimmed.to_string())
    }

    /// Check every weekday is in 0..=6, then sort and deduplicate
    fn normalize_week_days(mut days: Vec<u8>) -> Result<Vec<u8>, DomainError> {
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            return Err(DomainError::InvalidWeekDay(format!(
                "{} (weekdays are numbered 0 = Sunday to 6 = Saturday)",
                bad
            )));
        }
        days.sort_unstable();
        days.dedup();
        Ok(days)
    }

    /// Reminder time must be `HH:MM`; a blank string means no reminder time
    fn validate_reminder_time(time: Option<String>) -> Result<Option<String>, DomainError> {
        match time {
            None => Ok(None),
            Some(t) if t.trim().is_empty() => Ok(None),
            Some(t) => {
                let trimmed = t.trim();
                NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| {
                    DomainError::InvalidValue {
                        message: format!("Reminder time '{}' must be in HH:MM format", trimmed),
                    }
                })?;
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}
