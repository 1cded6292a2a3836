//! Unified user statistics
//!
//! Every page that shows numbers (dashboard, stats, calendar header) reads
//! them from `UserStats::compute` so they always agree.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{BandColor, ExerciseLogEntry, WorkoutType};
use crate::schedule::{days_since_start, AdjustedDay, AdjustedSchedule};
use crate::streaks::{compute_streaks, schedule_streaks};

// ---------------------------------------------------------------------------
/// Time Ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
  SevenDays,
  OneMonth,
  ThreeMonths,
  AllTime,
}

impl TimeRange {
  /// Inclusive `(from, to)` bounds ending at `today`
  pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = match self {
      TimeRange::SevenDays => today - Duration::days(7),
      TimeRange::OneMonth => today - Duration::days(30),
      TimeRange::ThreeMonths => today - Duration::days(90),
      TimeRange::AllTime => NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
    };
    (from, today)
  }

  pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
    let (from, to) = self.bounds(today);
    date >= from && date <= to
  }

  pub fn label(&self) -> &'static str {
    match self {
      TimeRange::SevenDays => "Last 7 Days",
      TimeRange::OneMonth => "Last Month",
      TimeRange::ThreeMonths => "Last 3 Months",
      TimeRange::AllTime => "All Time",
    }
  }
}

// ---------------------------------------------------------------------------
/// User Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutsByType {
  pub push: u32,
  pub pull: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
  /// Distinct days with at least one logged exercise
  pub total_workouts: u32,
  /// Calendar week since start, unaffected by missed days
  pub current_week: i64,
  pub current_streak: u32,
  pub longest_streak: u32,
  /// Longest run of days that followed the schedule (rest days included)
  pub longest_schedule_streak: u32,
  pub workout_status: AdjustedDay,
  pub missed_workouts: i64,
  pub total_exercises: u32,
  pub completed_this_week: u32,
  pub average_reps_per_exercise: i64,
  pub most_used_band: BandColor,
  pub workouts_by_type: WorkoutsByType,
  pub start_date: NaiveDate,
  pub last_workout_date: Option<NaiveDate>,
}

impl UserStats {
  /// `completed` holds every date that counts as done for the schedule
  /// (exercise days plus rest days marked complete).
  pub fn compute(
    start: NaiveDate,
    today: NaiveDate,
    entries: &[ExerciseLogEntry],
    completed: &HashSet<NaiveDate>,
  ) -> Self {
    let schedule = AdjustedSchedule::new(start, today, completed.iter().copied());
    let workout_status = schedule.today_workout();

    let workout_dates: BTreeSet<NaiveDate> = entries.iter().map(|e| e.local_date()).collect();
    let streaks = compute_streaks(workout_dates.iter().copied());
    let schedule_streak = schedule_streaks(start, today, completed);

    let current_week = days_since_start(start, today).max(0) / 7 + 1;
    let week_start = start + Duration::days((current_week - 1) * 7);
    let week_end = week_start + Duration::days(6);
    let completed_this_week = workout_dates
      .range(week_start..=week_end)
      .count() as u32;

    let total_reps: i64 = entries.iter().map(|e| e.total_reps()).sum();
    let average_reps_per_exercise = if entries.is_empty() {
      0
    } else {
      (total_reps as f64 / entries.len() as f64).round() as i64
    };

    let mut workouts_by_type = WorkoutsByType::default();
    for entry in entries {
      match entry.workout_type {
        WorkoutType::Push => workouts_by_type.push += 1,
        WorkoutType::Pull => workouts_by_type.pull += 1,
        WorkoutType::Rest => {}
      }
    }

    Self {
      total_workouts: streaks.total_workout_days,
      current_week,
      current_streak: streaks.current_streak,
      longest_streak: streaks.longest_streak,
      longest_schedule_streak: schedule_streak.longest_streak,
      workout_status,
      missed_workouts: schedule.total_missed(),
      total_exercises: entries.len() as u32,
      completed_this_week,
      average_reps_per_exercise,
      most_used_band: most_used_band(entries),
      workouts_by_type,
      start_date: start,
      last_workout_date: workout_dates.iter().next_back().copied(),
    }
  }
}

/// Most frequent band. Ties go to the band seen first in newest-first order.
fn most_used_band(entries: &[ExerciseLogEntry]) -> BandColor {
  let mut newest_first: Vec<&ExerciseLogEntry> = entries.iter().collect();
  newest_first.sort_by(|a, b| b.created_at_utc.cmp(&a.created_at_utc));

  let mut counts: HashMap<BandColor, usize> = HashMap::new();
  let mut order: Vec<BandColor> = Vec::new();
  for entry in newest_first {
    let count = counts.entry(entry.band_color).or_insert(0);
    if *count == 0 {
      order.push(entry.band_color);
    }
    *count += 1;
  }

  let mut best: Option<(BandColor, usize)> = None;
  for band in order {
    let count = counts[&band];
    if best.map_or(true, |(_, c)| count > c) {
      best = Some((band, count));
    }
  }

  best.map(|(band, _)| band).unwrap_or(BandColor::White)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::DayStatus;
  use crate::test_utils::mock_exercise_on;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn test_time_range_bounds_and_labels() {
    let today = d("2025-06-30");
    assert_eq!(TimeRange::SevenDays.bounds(today), (d("2025-06-23"), today));
    assert_eq!(TimeRange::ThreeMonths.bounds(today).0, d("2025-04-01"));
    assert_eq!(TimeRange::AllTime.bounds(today).0, d("2020-01-01"));
    assert!(TimeRange::OneMonth.contains(d("2025-06-01"), today));
    assert!(!TimeRange::OneMonth.contains(d("2025-05-30"), today));
    assert_eq!(TimeRange::OneMonth.label(), "Last Month");
  }

  #[test]
  fn test_stats_for_new_user() {
    let start = d("2025-06-02");
    let stats = UserStats::compute(start, start, &[], &HashSet::new());
    assert_eq!(stats.total_workouts, 0);
    assert_eq!(stats.current_week, 1);
    assert_eq!(stats.most_used_band, BandColor::White);
    assert_eq!(stats.average_reps_per_exercise, 0);
    assert_eq!(stats.workout_status.workout_type, WorkoutType::Push);
    assert_eq!(stats.workout_status.status, DayStatus::Scheduled);
    assert_eq!(stats.last_workout_date, None);
  }

  #[test]
  fn test_stats_aggregate_log() {
    let start = d("2025-06-02");
    let today = d("2025-06-10"); // week 2
    let entries = vec![
      mock_exercise_on(d("2025-06-02"), "Chest Press", WorkoutType::Push, BandColor::White, 30, 5),
      mock_exercise_on(d("2025-06-02"), "Tricep Press", WorkoutType::Push, BandColor::White, 25, 4),
      mock_exercise_on(d("2025-06-03"), "Deadlift", WorkoutType::Pull, BandColor::Black, 20, 6),
      mock_exercise_on(d("2025-06-09"), "Chest Press", WorkoutType::Push, BandColor::LightGray, 28, 2),
    ];
    let completed: HashSet<NaiveDate> = entries.iter().map(|e| e.local_date()).collect();

    let stats = UserStats::compute(start, today, &entries, &completed);

    assert_eq!(stats.total_workouts, 3);
    assert_eq!(stats.total_exercises, 4);
    assert_eq!(stats.current_week, 2);
    assert_eq!(stats.completed_this_week, 1);
    assert_eq!(stats.workouts_by_type, WorkoutsByType { push: 3, pull: 1 });
    // (35 + 29 + 26 + 30) / 4 = 30
    assert_eq!(stats.average_reps_per_exercise, 30);
    assert_eq!(stats.most_used_band, BandColor::White);
    assert_eq!(stats.last_workout_date, Some(d("2025-06-09")));
    assert_eq!(stats.longest_streak, 2);
    assert_eq!(stats.current_streak, 1);
    // Missed: 6/05 Push, 6/06 Pull
    assert_eq!(stats.missed_workouts, 2);
  }
}
