/// Habit tracker operations
///
/// One function per REST operation. Each takes any `HabitStorage` plus a
/// params struct, so the HTTP layer stays a thin adapter and the operations
/// can be tested against an in-memory database.

pub mod create;
pub mod delete;
pub mod grid;
pub mod list;
pub mod logs;
pub mod stats;
pub mod update;

// Re-export action functions for easy access
pub use create::*;
pub use delete::*;
pub use grid::*;
pub use list::*;
pub use logs::*;
pub use stats::*;
pub use update::*;

use thiserror::Error;

use crate::domain::{DomainError, HabitId};
use crate::storage::StorageError;

/// Errors returned by the operations in this module
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Parse a habit id from a path or body
///
/// An id that is not a UUID cannot name a stored habit, so it is reported
/// the same way as an unknown one.
pub(crate) fn parse_habit_id(raw: &str) -> Result<HabitId, ActionError> {
    HabitId::from_string(raw).map_err(|_| {
        ActionError::Storage(StorageError::HabitNotFound {
            habit_id: raw.to_string(),
        })
    })
}
