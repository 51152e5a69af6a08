/// Listing habits (`GET /api/habits`)

use crate::actions::ActionError;
use crate::domain::Habit;
use crate::storage::HabitStorage;

/// Every habit, newest first
pub fn list_habits<S: HabitStorage>(storage: &S) -> Result<Vec<Habit>, ActionError> {
    let habits = storage.list_habits()?;
    tracing::debug!("Listed {} habits", habits.len());
    Ok(habits)
}
