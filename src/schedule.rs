//! X3 schedule calculation
//!
//! The program runs on a fixed 7-day template anchored at the user's start
//! date. Weeks 1-4 (adaptation) carry three rest days, week 5 onward
//! (intensification) carries one.
//!
//! Two views of the schedule are computed here:
//! - nominal: a pure function of (start date, target date)
//! - adjusted: every missed training day before today pushes the whole
//!   future schedule back one day, so the Push/Pull alternation is never
//!   broken by a skipped session
//!
//! Everything in this module is pure date arithmetic over `NaiveDate`.
//! Callers resolve "today" in the user's timezone first (see `timezone`).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::{DayStatus, WorkoutType};

use WorkoutType::{Pull, Push, Rest};

// ---------------------------------------------------------------------------
/// Templates
// ---------------------------------------------------------------------------

pub const ADAPTATION_TEMPLATE: [WorkoutType; 7] = [Push, Pull, Rest, Push, Pull, Rest, Rest];
pub const INTENSIFICATION_TEMPLATE: [WorkoutType; 7] = [Push, Pull, Push, Pull, Push, Pull, Rest];

/// Last week that uses the adaptation template
pub const ADAPTATION_WEEKS: i64 = 4;

/// Number of days shown by the rolling calendar view
pub const CALENDAR_WINDOW_DAYS: i64 = 35;

pub fn template_for_week(week: i64) -> &'static [WorkoutType; 7] {
  if week <= ADAPTATION_WEEKS {
    &ADAPTATION_TEMPLATE
  } else {
    &INTENSIFICATION_TEMPLATE
  }
}

// ---------------------------------------------------------------------------
/// Nominal Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominalDay {
  /// 1-based program week, 0 before the program starts
  pub week: i64,
  pub workout_type: WorkoutType,
  /// 0-based position inside the 7-day template
  pub day_in_week: i64,
}

impl NominalDay {
  const BEFORE_START: NominalDay = NominalDay {
    week: 0,
    workout_type: Rest,
    day_in_week: 0,
  };

  /// Position for a day offset counted from the start date
  pub fn from_offset(days_since_start: i64) -> Self {
    if days_since_start < 0 {
      return Self::BEFORE_START;
    }

    let week = days_since_start / 7 + 1;
    let day_in_week = days_since_start % 7;
    let workout_type = template_for_week(week)[day_in_week as usize];

    Self {
      week,
      workout_type,
      day_in_week,
    }
  }
}

/// Whole calendar days from `start` to `target` (negative when target is earlier)
pub fn days_since_start(start: NaiveDate, target: NaiveDate) -> i64 {
  target.signed_duration_since(start).num_days()
}

/// Workout the fixed template assigns to `target`
pub fn compute_nominal(start: NaiveDate, target: NaiveDate) -> NominalDay {
  NominalDay::from_offset(days_since_start(start, target))
}

// ---------------------------------------------------------------------------
/// Adjusted Schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustedDay {
  pub date: NaiveDate,
  pub week: i64,
  pub workout_type: WorkoutType,
  pub day_in_week: i64,
  pub status: DayStatus,
}

/// Schedule for one user as seen from `today`.
///
/// The missed-day count only depends on (start, today, completed), so it is
/// computed once and reused for every date looked up through this value.
#[derive(Debug, Clone)]
pub struct AdjustedSchedule {
  start: Option<NaiveDate>,
  today: NaiveDate,
  completed: HashSet<NaiveDate>,
  total_missed: i64,
}

impl AdjustedSchedule {
  pub fn new(
    start: NaiveDate,
    today: NaiveDate,
    completed: impl IntoIterator<Item = NaiveDate>,
  ) -> Self {
    let completed: HashSet<NaiveDate> = completed.into_iter().collect();
    let total_missed = count_missed_workout_days(start, today, &completed);

    Self {
      start: Some(start),
      today,
      completed,
      total_missed,
    }
  }

  /// Schedule for a user with no start date yet; every day is `BeforeStart`
  pub fn unstarted(today: NaiveDate) -> Self {
    Self {
      start: None,
      today,
      completed: HashSet::new(),
      total_missed: 0,
    }
  }

  pub fn start(&self) -> Option<NaiveDate> {
    self.start
  }

  pub fn today(&self) -> NaiveDate {
    self.today
  }

  /// Training days in `[start, today)` that were scheduled but not logged
  pub fn total_missed(&self) -> i64 {
    self.total_missed
  }

  pub fn is_completed(&self, date: NaiveDate) -> bool {
    self.completed.contains(&date)
  }

  pub fn day(&self, target: NaiveDate) -> AdjustedDay {
    let days = match self.start {
      Some(start) => days_since_start(start, target),
      None => -1,
    };

    if days < 0 {
      return AdjustedDay {
        date: target,
        week: 0,
        workout_type: Rest,
        day_in_week: 0,
        status: DayStatus::BeforeStart,
      };
    }

    if target < self.today {
      let nominal = NominalDay::from_offset(days);
      let status = if self.is_completed(target) {
        DayStatus::Completed
      } else {
        DayStatus::Missed
      };
      return AdjustedDay {
        date: target,
        week: nominal.week,
        workout_type: nominal.workout_type,
        day_in_week: nominal.day_in_week,
        status,
      };
    }

    let shifted = NominalDay::from_offset(days - self.total_missed);
    let status = if self.is_completed(target) {
      DayStatus::Completed
    } else {
      DayStatus::Scheduled
    };

    AdjustedDay {
      date: target,
      week: shifted.week,
      workout_type: shifted.workout_type,
      day_in_week: shifted.day_in_week,
      status,
    }
  }

  pub fn today_workout(&self) -> AdjustedDay {
    self.day(self.today)
  }

  /// Consecutive days starting at `from`, or None when the run would pass
  /// the last representable date
  pub fn range(&self, from: NaiveDate, days: i64) -> Option<Vec<AdjustedDay>> {
    (0..days.max(0))
      .map(|offset| {
        from
          .checked_add_signed(Duration::days(offset))
          .map(|date| self.day(date))
      })
      .collect()
  }

  /// Rolling calendar view starting at `from`
  pub fn calendar_window(&self, from: NaiveDate) -> Option<Vec<AdjustedDay>> {
    self.range(from, CALENDAR_WINDOW_DAYS)
  }

  /// Sunday-first month grid, padded with neighbouring-month days to whole weeks
  pub fn calendar_month(&self, year: i32, month: u32) -> Option<CalendarMonth> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
      NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
      NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_first.pred_opt()?;

    let lead = first.weekday().num_days_from_sunday() as i64;
    let trail = 6 - last.weekday().num_days_from_sunday() as i64;
    let grid_start = first.checked_sub_signed(Duration::days(lead))?;
    let grid_len = lead + days_since_start(first, last) + 1 + trail;

    let cells = self
      .range(grid_start, grid_len)?
      .into_iter()
      .map(|day| CalendarCell {
        in_month: day.date.month() == month && day.date.year() == year,
        is_today: day.date == self.today,
        day,
      })
      .collect();

    Some(CalendarMonth { year, month, cells })
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarCell {
  pub day: AdjustedDay,
  pub in_month: bool,
  pub is_today: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarMonth {
  pub year: i32,
  pub month: u32,
  pub cells: Vec<CalendarCell>,
}

/// Count non-rest nominal days in `[start, today)` absent from `completed`
pub fn count_missed_workout_days(
  start: NaiveDate,
  today: NaiveDate,
  completed: &HashSet<NaiveDate>,
) -> i64 {
  start
    .iter_days()
    .take_while(|d| *d < today)
    .filter(|d| !compute_nominal(start, *d).workout_type.is_rest())
    .filter(|d| !completed.contains(d))
    .count() as i64
}

/// One-shot adjusted lookup; prefer [`AdjustedSchedule`] for multiple dates
pub fn compute_adjusted(
  start: NaiveDate,
  target: NaiveDate,
  today: NaiveDate,
  completed: &HashSet<NaiveDate>,
) -> AdjustedDay {
  AdjustedSchedule::new(start, today, completed.iter().copied()).day(target)
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
