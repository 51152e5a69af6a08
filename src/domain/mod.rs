/// Domain module containing core business logic and data types
///
/// This module defines the core entities (Habit, CompletionRecord) and the
/// streak calculation that runs over a habit's completion history.

pub mod habit;
pub mod record;
pub mod streak;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use record::*;
pub use streak::*;
pub use types::*;

use chrono::{Local, NaiveDate};
use thiserror::Error;

/// Wire and storage format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("Invalid time of day: {0}")]
    InvalidTimeOfDay(String),

    #[error("Invalid weekday: {0}")]
    InvalidWeekDay(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}

/// The current calendar date on the local clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a `YYYY-MM-DD` date string
pub fn parse_date(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(format!("'{}' (expected YYYY-MM-DD)", s)))
}
