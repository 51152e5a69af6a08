/// Basic unit tests against the public library surface
use chrono::{Duration, NaiveDate};
use habit_tracker::actions::{self, CreateHabitParams, LogCompletionParams};
use habit_tracker::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(
            "Test Habit".to_string(),
            TimeOfDay::Morning,
            Frequency::Daily,
            vec![],
            false,
            None,
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert!(habit.is_scheduled_for(date("2024-06-12")));
    }

    #[test]
    fn test_completion_record_creation() {
        let habit_id = HabitId::new();
        let day = date("2024-06-12");

        let done = CompletionRecord::new(habit_id.clone(), day, true);
        assert_eq!(done.habit_id, habit_id);
        assert_eq!(done.date, day);
        assert!(done.completed_at.is_some());

        let open = CompletionRecord::incomplete(habit_id, day);
        assert!(!open.completed);
        assert_eq!(open.completed_at, None);
    }

    #[test]
    fn test_streak_examples() {
        let today = date("2024-06-15");
        let days = |offsets: &[i64]| -> Vec<NaiveDate> {
            offsets.iter().map(|d| today - Duration::days(*d)).collect()
        };

        assert_eq!(calculate_streaks(&[], today), StreakSummary::default());
        assert_eq!(
            calculate_streaks(&days(&[0, 1, 4, 5, 6]), today),
            StreakSummary {
                current_streak: 2,
                longest_streak: 3,
            }
        );
        assert_eq!(calculate_streaks(&days(&[3]), today).current_streak, 0);
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());
    }

    #[test]
    fn test_storage_is_object_safe() {
        let storage = SqliteStorage::open_in_memory().expect("Failed to open storage");
        let storage: &dyn HabitStorage = &storage;
        assert!(storage.list_habits().unwrap().is_empty());
    }

    #[test]
    fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let config = ServerConfig::new(temp_file.path().to_path_buf());
        let server = HabitTrackerServer::new(config);
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_rejects_bad_schedule() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut config = ServerConfig::new(temp_file.path().to_path_buf());
        config.reset_schedule = "0 0 * *".to_string();

        let result = HabitTrackerServer::new(config);
        assert!(matches!(result, Err(ServerError::Config(_))));
    }

    #[test]
    fn test_actions_against_storage() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let habit = actions::create_habit(
            &storage,
            CreateHabitParams {
                name: "Yoga".to_string(),
                time_of_day: "morning".to_string(),
                frequency: "weekly".to_string(),
                week_days: vec![2, 4],
                reminder_enabled: true,
                reminder_time: Some("07:00".to_string()),
            },
        )
        .unwrap();

        let today = date("2024-06-15");
        actions::log_completion_as_of(
            &storage,
            LogCompletionParams {
                habit_id: habit.id.to_string(),
                date: Some("2024-06-14".to_string()),
                completed: true,
            },
            today,
        )
        .unwrap();

        let stored = storage.get_habit(&habit.id).unwrap();
        assert_eq!(stored.current_streak, 1);
        assert_eq!(stored.longest_streak, 1);
        assert!(stored.reminder_enabled);
    }
}
