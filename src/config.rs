/// Server configuration
///
/// The binary fills a [`ServerConfig`] from command line flags and
/// environment variables; tests build one directly.

use std::path::PathBuf;

use crate::scheduler::{CronSchedule, ScheduleError, DEFAULT_RESET_SCHEDULE};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

/// Everything the server needs to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Path to the SQLite database file
    pub database: PathBuf,
    pub host: String,
    pub port: u16,
    /// Cron expression for the daily reset job (local time)
    pub reset_schedule: String,
}

impl ServerConfig {
    /// Defaults for everything except the database location
    pub fn new(database: PathBuf) -> Self {
        Self {
            database,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            reset_schedule: DEFAULT_RESET_SCHEDULE.to_string(),
        }
    }

    /// `host:port`, ready for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }

    /// Parse the reset schedule
    pub fn reset_schedule(&self) -> Result<CronSchedule, ScheduleError> {
        CronSchedule::parse(&self.reset_schedule)
    }

    /// Check the settings that can be checked before opening anything
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host cannot be empty".to_string());
        }
        if self.database.as_os_str().is_empty() {
            return Err("database path cannot be empty".to_string());
        }
        self.reset_schedule().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Pick a writable directory for the database file
///
/// Candidates in order: `~/.habit_tracker`, the platform data directory, the
/// platform config directory, `./.habit_tracker`, and finally the system temp
/// directory.
pub fn default_database_path() -> std::io::Result<PathBuf> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".habit_tracker")),
        dirs::data_dir().map(|p| p.join("habit_tracker")),
        dirs::config_dir().map(|p| p.join("habit_tracker")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker")),
    ];

    for dir in candidates.iter().flatten() {
        if is_writable_dir(dir) {
            return Ok(dir.join("habits.db"));
        }
    }

    let fallback = std::env::temp_dir().join("habit_tracker");
    std::fs::create_dir_all(&fallback)?;
    tracing::warn!(
        "No writable data directory found, using {}",
        fallback.display()
    );
    Ok(fallback.join("habits.db"))
}

fn is_writable_dir(dir: &std::path::Path) -> bool {
    if std::fs::create_dir_all(dir).is_err() {
        return false;
    }
    let probe = dir.join(".write_probe");
    let writable = std::fs::write(&probe, b"ok").is_ok();
    let _ = std::fs::remove_file(&probe);
    writable
}
