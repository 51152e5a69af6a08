/// Grid view data (`GET /api/grid`)
///
/// The daily view covers one date, the weekly view the Sunday..Saturday
/// week containing the requested date. Each habit gets one row with a cell
/// per day saying whether the habit was due and whether it was done.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::actions::ActionError;
use crate::domain::{self, weekday_index, DomainError, Habit, HabitId};
use crate::storage::HabitStorage;

/// Which grid to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridView {
    #[default]
    Daily,
    Weekly,
}

impl FromStr for GridView {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(GridView::Daily),
            "weekly" => Ok(GridView::Weekly),
            other => Err(DomainError::Validation {
                message: format!("unknown view '{}'. Valid options: daily, weekly", other),
            }),
        }
    }
}

/// Query parameters for the grid
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridParams {
    /// `daily` (default) or `weekly`
    pub view: Option<String>,
    /// Any date inside the wanted range; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub view: GridView,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub habit: Habit,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub scheduled: bool,
    pub completed: bool,
}

/// First (Sunday) and last (Saturday) day of the week containing `date`
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(weekday_index(date)));
    (start, start + Duration::days(6))
}

/// Build the grid for the requested view
pub fn habit_grid<S: HabitStorage>(
    storage: &S,
    params: GridParams,
) -> Result<GridResponse, ActionError> {
    habit_grid_as_of(storage, params, domain::today())
}

/// [`habit_grid`] with an explicit "today" as the default anchor date
pub fn habit_grid_as_of<S: HabitStorage>(
    storage: &S,
    params: GridParams,
    today: NaiveDate,
) -> Result<GridResponse, ActionError> {
    let view = match params.view.as_deref().filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw.parse()?,
        None => GridView::default(),
    };
    let anchor = match params.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => domain::parse_date(raw)?,
        None => today,
    };

    let (start_date, end_date) = match view {
        GridView::Daily => (anchor, anchor),
        GridView::Weekly => week_bounds(anchor),
    };
    let days: Vec<NaiveDate> = start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .collect();

    let done: HashSet<(HabitId, NaiveDate)> = storage
        .list_records(Some((start_date, end_date)))?
        .into_iter()
        .filter(|r| r.completed)
        .map(|r| (r.habit_id, r.date))
        .collect();

    let rows = storage
        .list_habits()?
        .into_iter()
        .map(|habit| {
            let cells = days
                .iter()
                .map(|&date| GridCell {
                    date,
                    scheduled: habit.is_scheduled_for(date),
                    completed: done.contains(&(habit.id.clone(), date)),
                })
                .collect();
            GridRow { habit, cells }
        })
        .collect();

    Ok(GridResponse {
        view,
        start_date,
        end_date,
        days,
        rows,
    })
}
