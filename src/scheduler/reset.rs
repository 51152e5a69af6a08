/// The daily reset job
///
/// For every habit, create an incomplete record for the day unless one is
/// already there. Running it twice for the same day changes nothing, and a
/// record written concurrently by a completion toggle wins.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::watch;

use crate::domain;
use crate::scheduler::CronSchedule;
use crate::storage::{HabitStorage, StorageError};

/// What one reset run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub habits_checked: usize,
    pub records_created: usize,
}

/// Ensure every habit has a record for `date`
pub fn run_daily_reset<S: HabitStorage>(
    storage: &S,
    date: NaiveDate,
) -> Result<ResetSummary, StorageError> {
    let habits = storage.list_habits()?;
    let mut summary = ResetSummary::default();

    for habit in &habits {
        summary.habits_checked += 1;
        if storage.ensure_record(&habit.id, date)? {
            summary.records_created += 1;
        }
    }

    Ok(summary)
}

/// Run the reset job on `schedule` until `shutdown` flips to `true`
///
/// Each run uses the local date at the moment it fires. A failed run is
/// logged and the loop carries on with the next occurrence.
pub async fn run_reset_loop<S>(
    storage: Arc<S>,
    schedule: CronSchedule,
    mut shutdown: watch::Receiver<bool>,
) where
    S: HabitStorage + Send + Sync + 'static,
{
    tracing::info!("Daily reset scheduled with '{}'", schedule);

    loop {
        let now = Local::now().naive_local();
        let Some(next) = schedule.next_after(&now) else {
            tracing::warn!("Reset schedule '{}' never fires again, stopping", schedule);
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!("Next daily reset at {}", next);

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                let storage = Arc::clone(&storage);
                let date = domain::today();
                let outcome =
                    tokio::task::spawn_blocking(move || run_daily_reset(storage.as_ref(), date)).await;

                match outcome {
                    Ok(Ok(summary)) => tracing::info!(
                        "Daily reset for {}: {} habits checked, {} records created",
                        date,
                        summary.habits_checked,
                        summary.records_created
                    ),
                    Ok(Err(e)) => tracing::error!("Daily reset for {} failed: {}", date, e),
                    Err(e) => tracing::error!("Daily reset task panicked: {}", e),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    tracing::info!("Daily reset scheduler stopped");
                    return;
                }
            }
        }
    }
}
