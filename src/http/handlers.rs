/// Request handlers for the REST surface
///
/// Each handler unpacks the request, calls the matching action against the
/// shared storage and wraps the result as JSON.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::actions::{
    self, CreateHabitParams, DeleteHabitResponse, GridParams, GridResponse, HabitStatsResponse,
    ListLogsParams, LogCompletionParams, LogWithHabit, UpdateHabitParams,
};
use crate::domain::{CompletionRecord, Habit};
use crate::http::{ApiError, AppState};

// -- Habits --

pub async fn list_habits(State(state): State<AppState>) -> Result<Json<Vec<Habit>>, ApiError> {
    Ok(Json(actions::list_habits(state.storage.as_ref())?))
}

pub async fn create_habit(
    State(state): State<AppState>,
    payload: Result<Json<CreateHabitParams>, JsonRejection>,
) -> Result<(StatusCode, Json<Habit>), ApiError> {
    let Json(params) = payload?;
    let habit = actions::create_habit(state.storage.as_ref(), params)?;
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateHabitParams>, JsonRejection>,
) -> Result<Json<Habit>, ApiError> {
    let Json(params) = payload?;
    Ok(Json(actions::update_habit(
        state.storage.as_ref(),
        &id,
        params,
    )?))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteHabitResponse>, ApiError> {
    Ok(Json(actions::delete_habit(state.storage.as_ref(), &id)?))
}

pub async fn habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitStatsResponse>, ApiError> {
    Ok(Json(actions::habit_stats(state.storage.as_ref(), &id)?))
}

// -- Logs --

pub async fn list_logs(
    State(state): State<AppState>,
    query: Result<Query<ListLogsParams>, QueryRejection>,
) -> Result<Json<Vec<LogWithHabit>>, ApiError> {
    let Query(params) = query?;
    Ok(Json(actions::list_logs(state.storage.as_ref(), params)?))
}

pub async fn today_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<LogWithHabit>>, ApiError> {
    Ok(Json(actions::today_logs(state.storage.as_ref())?))
}

pub async fn log_completion(
    State(state): State<AppState>,
    payload: Result<Json<LogCompletionParams>, JsonRejection>,
) -> Result<Json<CompletionRecord>, ApiError> {
    let Json(params) = payload?;
    Ok(Json(actions::log_completion(state.storage.as_ref(), params)?))
}

// -- Views --

pub async fn grid(
    State(state): State<AppState>,
    query: Result<Query<GridParams>, QueryRejection>,
) -> Result<Json<GridResponse>, ApiError> {
    let Query(params) = query?;
    Ok(Json(actions::habit_grid(state.storage.as_ref(), params)?))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("No such route")
}
