/// Scheduled background work
///
/// The only job is the daily reset, which makes sure every habit has a
/// completion record for the current day. It fires on a cron schedule.

pub mod cron;
pub mod reset;

pub use cron::CronSchedule;
pub use reset::{run_daily_reset, run_reset_loop, ResetSummary};

use thiserror::Error;

/// Default reset schedule: every day at local midnight
pub const DEFAULT_RESET_SCHEDULE: &str = "0 0 * * *";

/// Errors that can occur while setting up a schedule
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid cron expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },
}
