/// Creating new habits (`POST /api/habits`)

use serde::{Deserialize, Serialize};

use crate::actions::ActionError;
use crate::domain::{Frequency, Habit, TimeOfDay};
use crate::storage::HabitStorage;

/// Parameters for creating a new habit
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitParams {
    pub name: String,
    pub time_of_day: String, // parsed to TimeOfDay
    pub frequency: String,   // parsed to Frequency
    #[serde(default)]
    pub week_days: Vec<u8>,
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub reminder_time: Option<String>,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: HabitStorage>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<Habit, ActionError> {
    let time_of_day: TimeOfDay = params.time_of_day.parse()?;
    let frequency: Frequency = params.frequency.parse()?;

    let habit = Habit::new(
        params.name,
        time_of_day,
        frequency,
        params.week_days,
        params.reminder_enabled,
        params.reminder_time,
    )?;

    storage.create_habit(&habit)?;

    tracing::info!("Created habit '{}' ({})", habit.name, habit.id);
    Ok(habit)
}
