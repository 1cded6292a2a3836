//! Daily workout log backfill
//!
//! Replays every day from the start date through today against the program
//! template and produces the durable per-day log. Unlike the adjusted
//! schedule, the replay walks a sequence position that only advances on
//! rest days and logged workouts, so a missed slot is retried the next day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{DailyWorkoutLogEntry, LogStatus, LoggedWorkoutType, WorkoutType};
use crate::schedule::template_for_week;

/// Consecutive misses after which the legacy backfill restarted the program
pub const LEGACY_RESET_AFTER_MISSES: u32 = 8;

/// Whether long absences restart the program at week 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResetPolicy {
  /// Never restart; matches the live schedule calculator
  #[default]
  Never,
  /// Restart at week 1, slot 0 after this many consecutive missed slots
  AfterConsecutiveMisses { misses: u32 },
}

impl ResetPolicy {
  pub fn legacy() -> Self {
    ResetPolicy::AfterConsecutiveMisses {
      misses: LEGACY_RESET_AFTER_MISSES,
    }
  }

  fn should_reset(&self, consecutive_misses: u32) -> bool {
    match self {
      ResetPolicy::Never => false,
      ResetPolicy::AfterConsecutiveMisses { misses } => *misses > 0 && consecutive_misses >= *misses,
    }
  }
}

/// Build log entries for `[start, today]`.
///
/// `exercise_days` maps a local date to the workout actually performed that
/// day. A logged day records that type even when the slot said otherwise.
pub fn backfill_entries(
  start: NaiveDate,
  today: NaiveDate,
  exercise_days: &HashMap<NaiveDate, WorkoutType>,
  policy: ResetPolicy,
) -> Vec<DailyWorkoutLogEntry> {
  let mut entries = Vec::new();
  let mut week: i64 = 1;
  let mut position: usize = 0;
  let mut consecutive_misses: u32 = 0;

  for date in start.iter_days().take_while(|d| *d <= today) {
    let scheduled = template_for_week(week)[position];
    let performed = exercise_days.get(&date).copied();

    let (workout_type, status, advance) = match (scheduled, performed) {
      (WorkoutType::Rest, _) => (LoggedWorkoutType::Rest, LogStatus::Completed, true),
      (_, Some(done)) => (done.into(), LogStatus::Completed, true),
      (_, None) if date < today => (LoggedWorkoutType::Missed, LogStatus::Completed, false),
      (slot, None) => (slot.into(), LogStatus::Scheduled, false),
    };

    entries.push(DailyWorkoutLogEntry {
      date,
      workout_type,
      status,
      week_number: week,
    });

    if advance {
      consecutive_misses = 0;
      position += 1;
      if position >= 7 {
        position = 0;
        week += 1;
      }
    } else if workout_type == LoggedWorkoutType::Missed {
      consecutive_misses += 1;
      if policy.should_reset(consecutive_misses) {
        tracing::info!(%date, consecutive_misses, "program reset to week 1");
        week = 1;
        position = 0;
        consecutive_misses = 0;
      }
    }
  }

  entries
}
