/// Deleting habits (`DELETE /api/habits/{id}`)

use serde::Serialize;

use crate::actions::{parse_habit_id, ActionError};
use crate::storage::HabitStorage;

/// Response from deleting a habit
#[derive(Debug, Serialize)]
pub struct DeleteHabitResponse {
    pub message: String,
}

/// Delete a habit and every completion record that belongs to it
pub fn delete_habit<S: HabitStorage>(
    storage: &S,
    habit_id: &str,
) -> Result<DeleteHabitResponse, ActionError> {
    let habit_id = parse_habit_id(habit_id)?;
    storage.delete_habit(&habit_id)?;

    tracing::info!("Deleted habit {}", habit_id);
    Ok(DeleteHabitResponse {
        message: "Habit deleted".to_string(),
    })
}
