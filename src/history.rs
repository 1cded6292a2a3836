//! Per-exercise history: last set for pre-filling, personal best, band advice

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BandColor, ExerciseLogEntry, WorkoutType};

/// Combined reps at which a set is strong enough to move up a band
pub const BAND_ADVANCE_REPS: i64 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
  pub exercise_name: String,
  pub recent_band: Option<BandColor>,
  pub recent_full_reps: i64,
  pub recent_partial_reps: i64,
  pub recent_workout_date: Option<DateTime<Utc>>,
  /// Best full reps achieved with the heaviest band ever used
  pub best_full_reps: i64,
  pub best_band: Option<BandColor>,
  pub display_text: String,
}

impl ExerciseHistory {
  fn empty(exercise_name: &str) -> Self {
    Self {
      exercise_name: exercise_name.to_string(),
      recent_band: None,
      recent_full_reps: 0,
      recent_partial_reps: 0,
      recent_workout_date: None,
      best_full_reps: 0,
      best_band: None,
      display_text: exercise_name.to_uppercase(),
    }
  }
}

/// Build history for `exercise_name` from any mix of log entries.
///
/// The most recent set prefers entries from `workout_type` when there are
/// any, otherwise it uses the most recent set overall.
pub fn exercise_history(
  exercise_name: &str,
  entries: &[ExerciseLogEntry],
  workout_type: Option<WorkoutType>,
) -> ExerciseHistory {
  let mut sets: Vec<&ExerciseLogEntry> = entries
    .iter()
    .filter(|e| e.exercise_name == exercise_name)
    .collect();

  if sets.is_empty() {
    return ExerciseHistory::empty(exercise_name);
  }

  sets.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));

  let recent = workout_type
    .and_then(|wt| sets.iter().find(|e| e.workout_type == wt))
    .unwrap_or(&sets[0]);

  let best_band = sets.iter().map(|e| e.band_color).max();
  let best_full_reps = best_band
    .map(|band| {
      sets
        .iter()
        .filter(|e| e.band_color == band)
        .map(|e| e.full_reps)
        .max()
        .unwrap_or(0)
    })
    .unwrap_or(0);

  let display_text = if best_full_reps > 0 {
    format!("{} ({})", exercise_name.to_uppercase(), best_full_reps)
  } else {
    exercise_name.to_uppercase()
  };

  ExerciseHistory {
    exercise_name: exercise_name.to_string(),
    recent_band: Some(recent.band_color),
    recent_full_reps: recent.full_reps,
    recent_partial_reps: recent.partial_reps,
    recent_workout_date: Some(recent.created_at_utc),
    best_full_reps,
    best_band,
    display_text,
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandAdvice {
  pub exercise_name: String,
  pub current_band: BandColor,
  pub next_band: BandColor,
  pub total_reps: i64,
}

/// Suggest the next band once a set reaches [`BAND_ADVANCE_REPS`]
pub fn band_advance_suggestion(entry: &ExerciseLogEntry) -> Option<BandAdvice> {
  if entry.total_reps() < BAND_ADVANCE_REPS {
    return None;
  }

  entry.band_color.heavier().map(|next_band| BandAdvice {
    exercise_name: entry.exercise_name.clone(),
    current_band: entry.band_color,
    next_band,
    total_reps: entry.total_reps(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::mock_exercise;

  #[test]
  fn test_no_history_returns_defaults() {
    let history = exercise_history("Chest Press", &[], None);
    assert_eq!(history.recent_band, None);
    assert_eq!(history.best_full_reps, 0);
    assert_eq!(history.display_text, "CHEST PRESS");
  }

  #[test]
  fn test_best_reps_come_from_heaviest_band() {
    let entries = vec![
      mock_exercise("Chest Press", WorkoutType::Push, BandColor::White, 45, 3),
      mock_exercise("Chest Press", WorkoutType::Push, BandColor::DarkGray, 18, 4),
      mock_exercise("Chest Press", WorkoutType::Push, BandColor::DarkGray, 22, 2),
      mock_exercise("Deadlift", WorkoutType::Pull, BandColor::Elite, 30, 0),
    ];

    let history = exercise_history("Chest Press", &entries, None);
    assert_eq!(history.best_band, Some(BandColor::DarkGray));
    assert_eq!(history.best_full_reps, 22);
    assert_eq!(history.display_text, "CHEST PRESS (22)");
  }

  #[test]
  fn test_recent_set_prefers_requested_workout_type() {
    let mut older_pull = mock_exercise("Front Squat", WorkoutType::Pull, BandColor::Black, 20, 0);
    older_pull.created_at_utc = Utc::now() - chrono::Duration::days(3);
    let newest_push = mock_exercise("Front Squat", WorkoutType::Push, BandColor::DarkGray, 25, 5);

    let entries = vec![older_pull, newest_push];

    let any = exercise_history("Front Squat", &entries, None);
    assert_eq!(any.recent_band, Some(BandColor::DarkGray));

    let pull = exercise_history("Front Squat", &entries, Some(WorkoutType::Pull));
    assert_eq!(pull.recent_band, Some(BandColor::Black));
    assert_eq!(pull.recent_full_reps, 20);
  }

  #[test]
  fn test_band_advance_at_forty_reps() {
    let strong = mock_exercise("Bent Row", WorkoutType::Pull, BandColor::LightGray, 36, 4);
    let advice = band_advance_suggestion(&strong).unwrap();
    assert_eq!(advice.next_band, BandColor::DarkGray);
    assert_eq!(advice.total_reps, 40);

    let short = mock_exercise("Bent Row", WorkoutType::Pull, BandColor::LightGray, 30, 4);
    assert!(band_advance_suggestion(&short).is_none());

    let maxed = mock_exercise("Bent Row", WorkoutType::Pull, BandColor::Elite, 50, 0);
    assert!(band_advance_suggestion(&maxed).is_none());
  }
}
