/// Cron expression parsing and evaluation
///
/// Supports the five-field format `minute hour day month weekday` with `*`,
/// `*/n`, `a-b`, `a,b,c` and single values. Expressions are evaluated against
/// local wall-clock time. All five fields must match; a restricted day of
/// month and a restricted weekday are not OR-ed together.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

use crate::scheduler::ScheduleError;

/// How far ahead `next_after` looks before giving up
const SEARCH_HORIZON_DAYS: i64 = 366 * 4;

/// A parsed cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    source: String,
    minute: CronField,
    hour: CronField,
    day: CronField,
    month: CronField,
    /// 0 = Sunday
    weekday: CronField,
}

/// A single field in a cron expression
#[derive(Debug, Clone, PartialEq, Eq)]
enum CronField {
    Any,
    Value(u32),
    List(Vec<u32>),
    Range(u32, u32),
    /// `*/n`: every nth value counting from the field minimum
    Step { min: u32, step: u32 },
}

impl CronField {
    fn matches(&self, value: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Value(v) => *v == value,
            Self::List(values) => values.contains(&value),
            Self::Range(start, end) => (*start..=*end).contains(&value),
            Self::Step { min, step } => value >= *min && (value - min) % step == 0,
        }
    }

    fn parse(field: &str, name: &str, min: u32, max: u32) -> Result<Self, String> {
        let number = |raw: &str| -> Result<u32, String> {
            let value: u32 = raw
                .parse()
                .map_err(|_| format!("{} field: '{}' is not a number", name, raw))?;
            if value < min || value > max {
                return Err(format!(
                    "{} field: {} is outside {}-{}",
                    name, value, min, max
                ));
            }
            Ok(value)
        };

        if field == "*" {
            return Ok(Self::Any);
        }

        if let Some(step) = field.strip_prefix("*/") {
            let step: u32 = step
                .parse()
                .map_err(|_| format!("{} field: invalid step '{}'", name, step))?;
            if step == 0 || step > max {
                return Err(format!("{} field: step must be 1-{}", name, max));
            }
            return Ok(Self::Step { min, step });
        }

        if field.contains(',') {
            let values = field.split(',').map(number).collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::List(values));
        }

        if let Some((start, end)) = field.split_once('-') {
            let start = number(start)?;
            let end = number(end)?;
            if start > end {
                return Err(format!(
                    "{} field: range {}-{} runs backwards",
                    name, start, end
                ));
            }
            return Ok(Self::Range(start, end));
        }

        Ok(Self::Value(number(field)?))
    }
}

impl CronSchedule {
    /// Parse a five-field cron expression
    ///
    /// # Examples
    ///
    /// - `0 0 * * *` - daily at midnight
    /// - `*/15 * * * *` - every 15 minutes
    /// - `30 6 * * 1-5` - 06:30 on weekdays
    pub fn parse(expr: &str) -> Result<Self, ScheduleError> {
        let invalid = |reason: String| ScheduleError::InvalidExpression {
            expression: expr.to_string(),
            reason,
        };

        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(invalid(format!(
                "expected 5 fields (minute hour day month weekday), found {}",
                parts.len()
            )));
        }

        Ok(Self {
            source: parts.join(" "),
            minute: CronField::parse(parts[0], "minute", 0, 59).map_err(invalid)?,
            hour: CronField::parse(parts[1], "hour", 0, 23).map_err(invalid)?,
            day: CronField::parse(parts[2], "day", 1, 31).map_err(invalid)?,
            month: CronField::parse(parts[3], "month", 1, 12).map_err(invalid)?,
            weekday: CronField::parse(parts[4], "weekday", 0, 6).map_err(invalid)?,
        })
    }

    /// Does the schedule fire at this minute?
    pub fn matches(&self, time: &NaiveDateTime) -> bool {
        self.matches_date(time)
            && self.minute.matches(time.minute())
            && self.hour.matches(time.hour())
    }

    fn matches_date(&self, time: &NaiveDateTime) -> bool {
        self.day.matches(time.day())
            && self.month.matches(time.month())
            && self.weekday.matches(time.weekday().num_days_from_sunday())
    }

    /// The first matching minute strictly after `after`
    ///
    /// Returns `None` when nothing matches within the next four years
    /// (e.g. `0 0 31 2 *`).
    pub fn next_after(&self, after: &NaiveDateTime) -> Option<NaiveDateTime> {
        let start_of_minute = after.date().and_hms_opt(after.hour(), after.minute(), 0)?;
        let mut current = start_of_minute + Duration::minutes(1);
        let horizon = current + Duration::days(SEARCH_HORIZON_DAYS);

        while current <= horizon {
            if !self.matches_date(&current) {
                // Skip the rest of a day that cannot match
                current = current.date().succ_opt()?.and_hms_opt(0, 0, 0)?;
                continue;
            }
            if self.matches(&current) {
                return Some(current);
            }
            current += Duration::minutes(1);
        }
        None
    }
}

impl FromStr for CronSchedule {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
