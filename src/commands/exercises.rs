//! Tauri commands for logging sets and reading exercise history

use std::sync::Arc;
use tauri::State;

use super::clock;
use crate::db::AppState;
use crate::history::ExerciseHistory;
use crate::models::{NewExerciseLogEntry, WorkoutType};
use crate::tracker::{self, LoggedExercise};

/// Log a set; `performed_at` backdates a manual entry
#[tauri::command]
pub async fn log_exercise(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  entry: NewExerciseLogEntry,
  performed_at: Option<String>,
) -> Result<LoggedExercise, String> {
  tracker::log_exercise(
    &state.db,
    &user_id,
    entry,
    performed_at.as_deref(),
    &clock(&state),
  )
  .await
  .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_exercise_history(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  exercise_name: String,
  workout_type: Option<WorkoutType>,
) -> Result<ExerciseHistory, String> {
  tracker::exercise_history(&state.db, &user_id, &exercise_name, workout_type)
    .await
    .map_err(|e| e.to_string())
}
