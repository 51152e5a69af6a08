/// Streak calculation over a habit's completion history
///
/// The calculation is a pure function of the completed dates and "today".
/// Callers replay the full history every time a habit's completion set
/// changes and store the result on the habit; nothing is patched
/// incrementally.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result of a streak calculation
///
/// `longest_streak >= current_streak` holds for every value produced by
/// [`calculate_streaks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Consecutive completed days ending today or yesterday
    pub current_streak: u32,
    /// Longest run of consecutive completed days anywhere in the history
    pub longest_streak: u32,
}

/// Calculate current and longest streak from the dates a habit was completed
///
/// Dates may arrive in any order; only completed days should be passed in.
/// The most recent date starts the current streak if it is today or
/// yesterday (or later than today). The current streak is then only
/// extended by the second most recent date: it is assigned at index 1 of the
/// newest-first list and never revisited for older entries. That index-1
/// assignment also happens when the head itself was too old to count.
pub fn calculate_streaks(completed: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    let mut dates = completed.to_vec();
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();

    let mut current_streak = 0;
    let mut longest_streak = 0;
    let mut temp_streak = 0;

    for (i, date) in dates.iter().enumerate() {
        if i == 0 {
            let days_since = (today - *date).num_days();
            if days_since <= 1 {
                current_streak = 1;
                temp_streak = 1;
            }
        } else {
            let gap = (dates[i - 1] - *date).num_days();
            if gap == 1 {
                temp_streak += 1;
                if i == 1 {
                    current_streak = temp_streak;
                }
            } else {
                temp_streak = 1;
            }
        }

        longest_streak = longest_streak.max(temp_streak);
    }

    StreakSummary {
        current_streak,
        longest_streak,
    }
}
