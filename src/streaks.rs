//! Streak aggregation over workout dates
//!
//! Three flavours are computed:
//! - `compute_streaks`: plain consecutive-calendar-day runs of logged workouts
//! - `schedule_streaks`: runs of days that followed the X3 schedule, where a
//!   scheduled rest day counts as done
//! - `log_streak`: completed daily-log rows back to the last recorded miss

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::models::{DailyWorkoutLogEntry, LoggedWorkoutType};
use crate::schedule::compute_nominal;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
  /// Run length ending at the most recent counted day
  pub current_streak: u32,
  pub longest_streak: u32,
  pub total_workout_days: u32,
}

/// Streaks over distinct workout dates. Input order and duplicates don't matter.
pub fn compute_streaks(dates: impl IntoIterator<Item = NaiveDate>) -> StreakSummary {
  let sorted: BTreeSet<NaiveDate> = dates.into_iter().collect();

  let mut longest = 0u32;
  let mut run = 0u32;
  let mut prev: Option<NaiveDate> = None;

  for date in &sorted {
    run = match prev {
      Some(p) if *date - p == Duration::days(1) => run + 1,
      _ => 1,
    };
    longest = longest.max(run);
    prev = Some(*date);
  }

  StreakSummary {
    current_streak: run,
    longest_streak: longest,
    total_workout_days: sorted.len() as u32,
  }
}

/// Streaks of days that followed the schedule, from `start` through `today`.
///
/// A nominal rest day counts as followed. `total_workout_days` counts only
/// the completed training days.
pub fn schedule_streaks(
  start: NaiveDate,
  today: NaiveDate,
  completed: &HashSet<NaiveDate>,
) -> StreakSummary {
  let mut longest = 0u32;
  let mut run = 0u32;
  let mut workout_days = 0u32;

  for date in start.iter_days().take_while(|d| *d <= today) {
    let is_rest = compute_nominal(start, date).workout_type.is_rest();
    let done = completed.contains(&date);

    if done && !is_rest {
      workout_days += 1;
    }

    if is_rest || done {
      run += 1;
      longest = longest.max(run);
    } else if date < today {
      run = 0;
    }
  }

  StreakSummary {
    current_streak: run,
    longest_streak: longest,
    total_workout_days: workout_days,
  }
}

/// Count completed log rows newest-first, stopping at the first miss.
/// Rows after `today` are ignored.
pub fn log_streak(entries: &[DailyWorkoutLogEntry], today: NaiveDate) -> u32 {
  let mut relevant: Vec<&DailyWorkoutLogEntry> =
    entries.iter().filter(|e| e.date <= today).collect();
  relevant.sort_by(|a, b| b.date.cmp(&a.date));

  let mut streak = 0;
  for entry in relevant {
    if entry.workout_type == LoggedWorkoutType::Missed {
      break;
    }
    if entry.counts_as_completed() {
      streak += 1;
    }
  }
  streak
}
