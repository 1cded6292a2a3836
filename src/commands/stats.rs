use std::sync::Arc;
use tauri::State;

use super::clock;
use crate::db::AppState;
use crate::stats::{TimeRange, UserStats};
use crate::tracker;

#[tauri::command]
pub async fn get_user_stats(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  range: Option<TimeRange>,
) -> Result<UserStats, String> {
  let range = range.unwrap_or(TimeRange::AllTime);
  tracker::user_stats(&state.db, &user_id, range, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_daily_log_streak(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<u32, String> {
  tracker::daily_log_streak(&state.db, &user_id, &clock(&state))
    .await
    .map_err(|e| e.to_string())
}
