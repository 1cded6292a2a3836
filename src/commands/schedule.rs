//! Tauri commands for the schedule, calendar and program start

use chrono::NaiveDate;
use std::sync::Arc;
use tauri::State;

use super::clock;
use crate::backfill::ResetPolicy;
use crate::db::AppState;
use crate::models::{DailyWorkoutLogEntry, Profile};
use crate::schedule::{AdjustedDay, CalendarMonth};
use crate::tracker;

#[tauri::command]
pub async fn get_todays_workout(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<AdjustedDay, String> {
  tracker::todays_workout(&state.db, &user_id, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_workout_for_date(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  date: NaiveDate,
) -> Result<AdjustedDay, String> {
  tracker::workout_for_date(&state.db, &user_id, date, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

/// 35-day window starting at `from` (today when omitted)
#[tauri::command]
pub async fn get_calendar_window(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  from: Option<NaiveDate>,
) -> Result<Vec<AdjustedDay>, String> {
  tracker::calendar_window(&state.db, &user_id, from, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_calendar_month(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  year: i32,
  month: u32,
) -> Result<CalendarMonth, String> {
  tracker::calendar_month(&state.db, &user_id, year, month, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn complete_rest_day(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<DailyWorkoutLogEntry, String> {
  tracker::complete_rest_day(&state.db, &user_id, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn backfill_daily_log(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  reset_policy: Option<ResetPolicy>,
) -> Result<Vec<DailyWorkoutLogEntry>, String> {
  tracker::backfill_daily_log(
    &state.db,
    &user_id,
    reset_policy.unwrap_or_default(),
    &clock(&state),
  )
  .await
  .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_profile(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<Profile, String> {
  tracker::get_profile(&state.db, &user_id)
    .await
    .map_err(|e| e.to_string())
}

/// Timezone defaults to the configured one for new profiles
#[tauri::command]
pub async fn set_program_start(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  start_date: NaiveDate,
  timezone: Option<String>,
) -> Result<Profile, String> {
  let timezone = timezone.unwrap_or_else(|| state.config.default_timezone.name().to_string());
  tracker::set_program_start(&state.db, &user_id, start_date, Some(timezone.as_str()))
    .await
    .map_err(|e| e.to_string())
}
