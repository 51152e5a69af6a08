/// Per-habit statistics (`GET /api/habits/{id}/stats`)

use chrono::NaiveDate;
use serde::Serialize;

use crate::actions::{parse_habit_id, ActionError};
use crate::domain::{self, calculate_streaks, Habit};
use crate::storage::HabitStorage;

/// Completion totals and freshly calculated streaks for one habit
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStatsResponse {
    pub total_completed: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub habit: Habit,
}

/// Gather statistics for a habit
///
/// Streaks are calculated from the completion history on every call rather
/// than read from the counters stored on the habit. Nothing is written back.
pub fn habit_stats<S: HabitStorage>(
    storage: &S,
    habit_id: &str,
) -> Result<HabitStatsResponse, ActionError> {
    habit_stats_as_of(storage, habit_id, domain::today())
}

/// [`habit_stats`] with an explicit "today" for the streak calculation
pub fn habit_stats_as_of<S: HabitStorage>(
    storage: &S,
    habit_id: &str,
    today: NaiveDate,
) -> Result<HabitStatsResponse, ActionError> {
    let habit_id = parse_habit_id(habit_id)?;
    let habit = storage.get_habit(&habit_id)?;

    let dates = storage.completed_dates(&habit_id)?;
    let streaks = calculate_streaks(&dates, today);

    Ok(HabitStatsResponse {
        total_completed: dates.len(),
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak,
        habit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{storage, stored_habit};
    use crate::storage::StorageError;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_stats_recompute_streaks() {
        let storage = storage();
        let habit = stored_habit(&storage, "Guitar");
        for days_back in [0, 1, 4, 5, 6] {
            storage
                .upsert_record(&habit.id, today() - Duration::days(days_back), true, None)
                .unwrap();
        }
        storage
            .upsert_record(&habit.id, today() - Duration::days(2), false, None)
            .unwrap();

        let stats = habit_stats_as_of(&storage, &habit.id.to_string(), today()).unwrap();
        assert_eq!(stats.total_completed, 5);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 3);

        // Stored counters were never refreshed, and stats does not write them
        assert_eq!(stats.habit.current_streak, 0);
        assert_eq!(storage.get_habit(&habit.id).unwrap().longest_streak, 0);
    }

    #[test]
    fn test_stats_json_shape() {
        let storage = storage();
        let habit = stored_habit(&storage, "Guitar");

        let stats = habit_stats_as_of(&storage, &habit.id.to_string(), today()).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalCompleted"], 0);
        assert_eq!(json["currentStreak"], 0);
        assert_eq!(json["longestStreak"], 0);
        assert_eq!(json["habit"]["name"], "Guitar");
    }

    #[test]
    fn test_stats_unknown_habit() {
        let storage = storage();
        let result = habit_stats_as_of(&storage, "not-a-uuid", today());
        assert!(matches!(
            result,
            Err(ActionError::Storage(StorageError::HabitNotFound { .. }))
        ));
    }
}
