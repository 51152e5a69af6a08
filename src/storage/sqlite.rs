/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and completion records. It handles all SQL queries
/// and row conversion.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{
    CompletionRecord, Frequency, Habit, HabitId, RecordId, StreakSummary, TimeOfDay, DATE_FORMAT,
};
use crate::storage::{migrations, HabitStorage, StorageError};

const HABIT_COLUMNS: &str = "id, name, time_of_day, frequency, week_days, created_at, \
     current_streak, longest_streak, reminder_enabled, reminder_time";

const RECORD_COLUMNS: &str = "id, habit_id, date, completed, completed_at";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so one storage value can be shared
/// between request handlers and the daily reset job. Every operation holds
/// the lock for a single short statement or transaction.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn)?;
        tracing::info!("SQLite storage initialized at: {}", db_path.display());
        Ok(storage)
    }

    /// Open a private in-memory database (used by tests)
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", "ON").map_err(|e| {
            StorageError::Connection(format!("Failed to enable foreign keys: {}", e))
        })?;

        migrations::initialize_database(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("database lock poisoned".to_string()))
    }
}

/// Wrap a parse failure so it surfaces as a rusqlite conversion error
fn conversion_error<E>(column: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e))
}

fn parse_date_column(column: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| conversion_error(column, e))
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    let id_str: String = row.get(0)?;
    let id = HabitId::from_string(&id_str).map_err(|e| conversion_error(0, e))?;

    let time_of_day_str: String = row.get(2)?;
    let time_of_day = time_of_day_str
        .parse::<TimeOfDay>()
        .map_err(|e| conversion_error(2, e))?;

    let frequency_str: String = row.get(3)?;
    let frequency = frequency_str
        .parse::<Frequency>()
        .map_err(|e| conversion_error(3, e))?;

    let week_days_json: String = row.get(4)?;
    let week_days: Vec<u8> =
        serde_json::from_str(&week_days_json).map_err(|e| conversion_error(4, e))?;

    let created_at_str: String = row.get(5)?;
    let created_at = parse_timestamp(5, &created_at_str)?;

    Ok(Habit::from_existing(
        id,
        row.get(1)?, // name
        time_of_day,
        frequency,
        week_days,
        created_at,
        row.get(6)?, // current_streak
        row.get(7)?, // longest_streak
        row.get(8)?, // reminder_enabled
        row.get(9)?, // reminder_time
    ))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionRecord> {
    let id_str: String = row.get(0)?;
    let id = RecordId::from_string(&id_str).map_err(|e| conversion_error(0, e))?;

    let habit_id_str: String = row.get(1)?;
    let habit_id = HabitId::from_string(&habit_id_str).map_err(|e| conversion_error(1, e))?;

    let date_str: String = row.get(2)?;
    let date = parse_date_column(2, &date_str)?;

    let completed_at_str: Option<String> = row.get(4)?;
    let completed_at = completed_at_str
        .map(|s| parse_timestamp(4, &s))
        .transpose()?;

    Ok(CompletionRecord::from_existing(
        id,
        habit_id,
        date,
        row.get(3)?, // completed
        completed_at,
    ))
}

fn query_record(
    conn: &Connection,
    habit_id: &HabitId,
    date: NaiveDate,
) -> Result<Option<CompletionRecord>, StorageError> {
    let sql = format!(
        "SELECT {} FROM completion_records WHERE habit_id = ?1 AND date = ?2",
        RECORD_COLUMNS
    );
    let record = conn
        .query_row(
            &sql,
            params![habit_id.to_string(), date.format(DATE_FORMAT).to_string()],
            record_from_row,
        )
        .optional()?;
    Ok(record)
}

/// Translate constraint failures on record inserts into storage errors
fn map_record_insert_error(err: rusqlite::Error, habit_id: &HabitId, date: NaiveDate) -> StorageError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return StorageError::DuplicateRecord {
                habit_id: habit_id.to_string(),
                date: date.format(DATE_FORMAT).to_string(),
            };
        }
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
            return StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            };
        }
    }
    StorageError::Query(err)
}

impl HabitStorage for SqliteStorage {
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let week_days_json = serde_json::to_string(&habit.week_days)?;

        self.conn()?.execute(
            "INSERT INTO habits (
                id, name, time_of_day, frequency, week_days, created_at,
                current_streak, longest_streak, reminder_enabled, reminder_time
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.time_of_day.as_str(),
                habit.frequency.as_str(),
                week_days_json,
                format_timestamp(&habit.created_at),
                habit.current_streak,
                habit.longest_streak,
                habit.reminder_enabled,
                habit.reminder_time,
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let sql = format!("SELECT {} FROM habits WHERE id = ?1", HABIT_COLUMNS);

        self.conn()?
            .query_row(&sql, params![habit_id.to_string()], habit_from_row)
            .optional()?
            .ok_or_else(|| StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            })
    }

    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        let week_days_json = serde_json::to_string(&habit.week_days)?;

        let rows_affected = self.conn()?.execute(
            "UPDATE habits SET
                name = ?2,
                time_of_day = ?3,
                frequency = ?4,
                week_days = ?5,
                reminder_enabled = ?6,
                reminder_time = ?7
             WHERE id = ?1",
            params![
                habit.id.to_string(),
                habit.name,
                habit.time_of_day.as_str(),
                habit.frequency.as_str(),
                week_days_json,
                habit.reminder_enabled,
                habit.reminder_time,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let records_deleted = tx.execute(
            "DELETE FROM completion_records WHERE habit_id = ?1",
            params![habit_id.to_string()],
        )?;
        let rows_affected = tx.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            // Dropping the transaction rolls it back
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tx.commit()?;

        tracing::debug!(
            "Deleted habit {} and {} completion records",
            habit_id,
            records_deleted
        );
        Ok(())
    }

    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let sql = format!(
            "SELECT {} FROM habits ORDER BY created_at DESC, rowid DESC",
            HABIT_COLUMNS
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let habits = stmt
            .query_map([], habit_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(habits)
    }

    fn update_streaks(
        &self,
        habit_id: &HabitId,
        streaks: &StreakSummary,
    ) -> Result<(), StorageError> {
        let rows_affected = self.conn()?.execute(
            "UPDATE habits SET current_streak = ?2, longest_streak = ?3 WHERE id = ?1",
            params![
                habit_id.to_string(),
                streaks.current_streak,
                streaks.longest_streak
            ],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!(
            "Updated streaks for habit {}: current {}, longest {}",
            habit_id,
            streaks.current_streak,
            streaks.longest_streak
        );
        Ok(())
    }

    fn upsert_record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<CompletionRecord, StorageError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO completion_records (id, habit_id, date, completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (habit_id, date) DO UPDATE SET
                completed = excluded.completed,
                completed_at = excluded.completed_at",
            params![
                RecordId::new().to_string(),
                habit_id.to_string(),
                date.format(DATE_FORMAT).to_string(),
                completed,
                completed_at.as_ref().map(format_timestamp),
            ],
        )
        .map_err(|e| map_record_insert_error(e, habit_id, date))?;

        let record = query_record(&conn, habit_id, date)?
            .ok_or(StorageError::Query(rusqlite::Error::QueryReturnedNoRows))?;

        tracing::debug!(
            "Upserted record for habit {} on {} (completed: {})",
            habit_id,
            date,
            completed
        );
        Ok(record)
    }

    fn get_record(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
    ) -> Result<Option<CompletionRecord>, StorageError> {
        let conn = self.conn()?;
        query_record(&conn, habit_id, date)
    }

    fn create_record(&self, record: &CompletionRecord) -> Result<(), StorageError> {
        self.conn()?
            .execute(
                "INSERT INTO completion_records (id, habit_id, date, completed, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id.to_string(),
                    record.habit_id.to_string(),
                    record.date.format(DATE_FORMAT).to_string(),
                    record.completed,
                    record.completed_at.as_ref().map(format_timestamp),
                ],
            )
            .map_err(|e| map_record_insert_error(e, &record.habit_id, record.date))?;

        tracing::debug!(
            "Created record {} for habit {} on {}",
            record.id,
            record.habit_id,
            record.date
        );
        Ok(())
    }

    fn list_records(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let conn = self.conn()?;

        let records = match range {
            Some((start, end)) => {
                let sql = format!(
                    "SELECT {} FROM completion_records
                     WHERE date BETWEEN ?1 AND ?2
                     ORDER BY date, habit_id",
                    RECORD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(
                    params![
                        start.format(DATE_FORMAT).to_string(),
                        end.format(DATE_FORMAT).to_string()
                    ],
                    record_from_row,
                )?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM completion_records ORDER BY date, habit_id",
                    RECORD_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map([], record_from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(records)
    }

    fn completed_dates(&self, habit_id: &HabitId) -> Result<Vec<NaiveDate>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date FROM completion_records
             WHERE habit_id = ?1 AND completed = 1
             ORDER BY date DESC",
        )?;

        let dates = stmt
            .query_map(params![habit_id.to_string()], |row| {
                let date_str: String = row.get(0)?;
                parse_date_column(0, &date_str)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(dates)
    }
}
