/// Completion log operations
///
/// Listing records (`GET /api/logs`, `GET /api/logs/today`) and toggling a
/// habit's completion for a date (`POST /api/logs`). Every toggle replays the
/// habit's whole completion history through the streak calculator and stores
/// the result on the habit.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::{parse_habit_id, ActionError};
use crate::domain::{self, calculate_streaks, CompletionRecord, Habit, HabitId, StreakSummary};
use crate::storage::HabitStorage;

/// Query parameters for listing records
///
/// Both bounds are inclusive. When either one is missing or blank every
/// record is returned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLogsParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A completion record with its habit joined in
///
/// `habit` is `None` only if the habit vanished between the two reads.
#[derive(Debug, Clone, Serialize)]
pub struct LogWithHabit {
    #[serde(flatten)]
    pub record: CompletionRecord,
    pub habit: Option<Habit>,
}

/// Body of a completion toggle
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogCompletionParams {
    pub habit_id: String,
    /// `YYYY-MM-DD`; defaults to today
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// List records in a date range, each with its habit
pub fn list_logs<S: HabitStorage>(
    storage: &S,
    params: ListLogsParams,
) -> Result<Vec<LogWithHabit>, ActionError> {
    let start = non_blank(params.start_date);
    let end = non_blank(params.end_date);

    let range = match (start, end) {
        (Some(start), Some(end)) => Some((domain::parse_date(&start)?, domain::parse_date(&end)?)),
        _ => None,
    };

    let records = storage.list_records(range)?;
    join_habits(storage, records)
}

/// Records for the current local date, each with its habit
pub fn today_logs<S: HabitStorage>(storage: &S) -> Result<Vec<LogWithHabit>, ActionError> {
    logs_for_date(storage, domain::today())
}

/// Records for a single date, each with its habit
pub fn logs_for_date<S: HabitStorage>(
    storage: &S,
    date: NaiveDate,
) -> Result<Vec<LogWithHabit>, ActionError> {
    let records = storage.list_records(Some((date, date)))?;
    join_habits(storage, records)
}

/// Mark a habit complete or incomplete for a date and refresh its streaks
pub fn log_completion<S: HabitStorage>(
    storage: &S,
    params: LogCompletionParams,
) -> Result<CompletionRecord, ActionError> {
    log_completion_as_of(storage, params, domain::today())
}

/// [`log_completion`] with an explicit "today" for the streak calculation
pub fn log_completion_as_of<S: HabitStorage>(
    storage: &S,
    params: LogCompletionParams,
    today: NaiveDate,
) -> Result<CompletionRecord, ActionError> {
    let habit_id = parse_habit_id(&params.habit_id)?;

    // Verify habit exists before touching the log
    storage.get_habit(&habit_id)?;

    let date = match non_blank(params.date) {
        Some(raw) => domain::parse_date(&raw)?,
        None => today,
    };

    let completed_at = params.completed.then(Utc::now);
    let record = storage.upsert_record(&habit_id, date, params.completed, completed_at)?;

    let streaks = refresh_streaks(storage, &habit_id, today)?;

    tracing::info!(
        "Logged habit {} on {} as {} (current streak {}, longest {})",
        habit_id,
        date,
        if params.completed { "done" } else { "not done" },
        streaks.current_streak,
        streaks.longest_streak
    );
    Ok(record)
}

/// Recalculate a habit's streaks from its full history and store them
pub fn refresh_streaks<S: HabitStorage>(
    storage: &S,
    habit_id: &HabitId,
    today: NaiveDate,
) -> Result<StreakSummary, ActionError> {
    let dates = storage.completed_dates(habit_id)?;
    let streaks = calculate_streaks(&dates, today);
    storage.update_streaks(habit_id, &streaks)?;
    Ok(streaks)
}

fn join_habits<S: HabitStorage>(
    storage: &S,
    records: Vec<CompletionRecord>,
) -> Result<Vec<LogWithHabit>, ActionError> {
    let habits: HashMap<HabitId, Habit> = storage
        .list_habits()?
        .into_iter()
        .map(|h| (h.id.clone(), h))
        .collect();

    Ok(records
        .into_iter()
        .map(|record| {
            let habit = habits.get(&record.habit_id).cloned();
            LogWithHabit { record, habit }
        })
        .collect())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{storage, stored_habit};
    use crate::domain::DomainError;
    use crate::storage::StorageError;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn toggle(habit_id: &HabitId, date: NaiveDate, completed: bool) -> LogCompletionParams {
        LogCompletionParams {
            habit_id: habit_id.to_string(),
            date: Some(date.format(domain::DATE_FORMAT).to_string()),
            completed,
        }
    }

    #[test]
    fn test_log_completion_updates_streaks() {
        let storage = storage();
        let habit = stored_habit(&storage, "Push-ups");

        for days_back in [0, 1, 2] {
            let date = today() - Duration::days(days_back);
            log_completion_as_of(&storage, toggle(&habit.id, date, true), today()).unwrap();
        }

        let stored = storage.get_habit(&habit.id).unwrap();
        assert_eq!(stored.current_streak, 2);
        assert_eq!(stored.longest_streak, 3);
    }

    #[test]
    fn test_unchecking_today_recomputes() {
        let storage = storage();
        let habit = stored_habit(&storage, "Push-ups");

        log_completion_as_of(&storage, toggle(&habit.id, today(), true), today()).unwrap();
        assert_eq!(storage.get_habit(&habit.id).unwrap().current_streak, 1);

        let record =
            log_completion_as_of(&storage, toggle(&habit.id, today(), false), today()).unwrap();
        assert!(!record.completed);
        assert_eq!(record.completed_at, None);

        let stored = storage.get_habit(&habit.id).unwrap();
        assert_eq!(stored.current_streak, 0);
        assert_eq!(stored.longest_streak, 0);
    }

    #[test]
    fn test_completed_record_is_stamped() {
        let storage = storage();
        let habit = stored_habit(&storage, "Vitamins");

        let record =
            log_completion_as_of(&storage, toggle(&habit.id, today(), true), today()).unwrap();
        assert!(record.completed);
        assert!(record.completed_at.is_some());
        assert_eq!(storage.list_records(None).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_date_means_today() {
        let storage = storage();
        let habit = stored_habit(&storage, "Vitamins");

        let params = LogCompletionParams {
            habit_id: habit.id.to_string(),
            date: None,
            completed: true,
        };
        let record = log_completion_as_of(&storage, params, today()).unwrap();
        assert_eq!(record.date, today());
    }

    #[test]
    fn test_log_unknown_habit() {
        let storage = storage();
        let result =
            log_completion_as_of(&storage, toggle(&HabitId::new(), today(), true), today());
        assert!(matches!(
            result,
            Err(ActionError::Storage(StorageError::HabitNotFound { .. }))
        ));
    }

    #[test]
    fn test_log_bad_date() {
        let storage = storage();
        let habit = stored_habit(&storage, "Vitamins");

        let params = LogCompletionParams {
            habit_id: habit.id.to_string(),
            date: Some("15/06/2024".to_string()),
            completed: true,
        };
        let result = log_completion_as_of(&storage, params, today());
        assert!(matches!(
            result,
            Err(ActionError::Domain(DomainError::InvalidDate(_)))
        ));
    }

    #[test]
    fn test_list_logs_joins_habit() {
        let storage = storage();
        let habit = stored_habit(&storage, "Stretch");
        storage.upsert_record(&habit.id, today(), true, None).unwrap();

        let logs = list_logs(&storage, ListLogsParams::default()).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].habit.as_ref().unwrap().name, "Stretch");

        let json = serde_json::to_value(&logs[0]).unwrap();
        assert_eq!(json["habitId"], habit.id.to_string());
        assert_eq!(json["date"], "2024-06-15");
        assert_eq!(json["habit"]["name"], "Stretch");
    }

    #[test]
    fn test_list_logs_range_needs_both_bounds() {
        let storage = storage();
        let habit = stored_habit(&storage, "Stretch");
        for days_back in [0, 3, 10] {
            storage
                .upsert_record(&habit.id, today() - Duration::days(days_back), true, None)
                .unwrap();
        }

        let ranged = list_logs(
            &storage,
            ListLogsParams {
                start_date: Some("2024-06-05".to_string()),
                end_date: Some("2024-06-12".to_string()),
            },
        )
        .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].record.date, today() - Duration::days(3));

        let open_ended = list_logs(
            &storage,
            ListLogsParams {
                start_date: Some("2024-06-05".to_string()),
                end_date: None,
            },
        )
        .unwrap();
        assert_eq!(open_ended.len(), 3);
    }

    #[test]
    fn test_logs_for_date() {
        let storage = storage();
        let first = stored_habit(&storage, "Stretch");
        let second = stored_habit(&storage, "Read");
        storage.upsert_record(&first.id, today(), true, None).unwrap();
        storage.upsert_record(&second.id, today(), false, None).unwrap();
        storage
            .upsert_record(&second.id, today() - Duration::days(1), true, None)
            .unwrap();

        let logs = logs_for_date(&storage, today()).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.record.date == today()));
    }
}
