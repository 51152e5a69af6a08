/// Updating existing habits (`PUT /api/habits/{id}`)
///
/// Any subset of the editable fields may be sent. Streak counters are not
/// editable here; unknown fields in the body (including `currentStreak` and
/// `longestStreak`) are ignored.

use serde::{Deserialize, Deserializer};

use crate::actions::{parse_habit_id, ActionError};
use crate::domain::{Frequency, Habit, HabitChanges, TimeOfDay};
use crate::storage::HabitStorage;

/// Parameters for updating an existing habit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitParams {
    pub name: Option<String>,
    pub time_of_day: Option<String>,
    pub frequency: Option<String>,
    pub week_days: Option<Vec<u8>>,
    pub reminder_enabled: Option<bool>,
    /// Absent leaves the reminder time alone, `null` clears it
    #[serde(default, deserialize_with = "deserialize_some")]
    pub reminder_time: Option<Option<String>>,
}

/// Distinguish a present `null` from a missing field
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateHabitParams {
    fn into_changes(self) -> Result<HabitChanges, ActionError> {
        let time_of_day = self
            .time_of_day
            .as_deref()
            .map(str::parse::<TimeOfDay>)
            .transpose()?;
        let frequency = self
            .frequency
            .as_deref()
            .map(str::parse::<Frequency>)
            .transpose()?;

        Ok(HabitChanges {
            name: self.name,
            time_of_day,
            frequency,
            week_days: self.week_days,
            reminder_enabled: self.reminder_enabled,
            reminder_time: self.reminder_time,
        })
    }
}

/// Update an existing habit using the provided storage
pub fn update_habit<S: HabitStorage>(
    storage: &S,
    habit_id: &str,
    params: UpdateHabitParams,
) -> Result<Habit, ActionError> {
    let habit_id = parse_habit_id(habit_id)?;
    let mut habit = storage.get_habit(&habit_id)?;

    habit.update(params.into_changes()?)?;
    storage.update_habit(&habit)?;

    tracing::info!("Updated habit '{}' ({})", habit.name, habit.id);
    Ok(habit)
}
