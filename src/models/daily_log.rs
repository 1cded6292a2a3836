use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WorkoutType;

/// Workout recorded in the daily log. `Missed` marks a workout slot that
/// passed without a logged session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoggedWorkoutType {
  Push,
  Pull,
  Rest,
  Missed,
}

impl LoggedWorkoutType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Push => "Push",
      Self::Pull => "Pull",
      Self::Rest => "Rest",
      Self::Missed => "Missed",
    }
  }
}

impl From<WorkoutType> for LoggedWorkoutType {
  fn from(w: WorkoutType) -> Self {
    match w {
      WorkoutType::Push => Self::Push,
      WorkoutType::Pull => Self::Pull,
      WorkoutType::Rest => Self::Rest,
    }
  }
}

impl std::str::FromStr for LoggedWorkoutType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Push" => Ok(Self::Push),
      "Pull" => Ok(Self::Pull),
      "Rest" => Ok(Self::Rest),
      "Missed" => Ok(Self::Missed),
      _ => Err(format!("Unknown logged workout type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
  Completed,
  Scheduled,
}

impl LogStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Completed => "completed",
      Self::Scheduled => "scheduled",
    }
  }
}

impl std::str::FromStr for LogStatus {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "completed" => Ok(Self::Completed),
      "scheduled" => Ok(Self::Scheduled),
      _ => Err(format!("Unknown log status: {}", s)),
    }
  }
}

/// Durable per-day record of what happened on a program day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWorkoutLogEntry {
  pub date: NaiveDate,
  pub workout_type: LoggedWorkoutType,
  pub status: LogStatus,
  pub week_number: i64,
}

impl DailyWorkoutLogEntry {
  /// A completed entry that was not a miss counts as the day being done
  pub fn counts_as_completed(&self) -> bool {
    self.status == LogStatus::Completed && self.workout_type != LoggedWorkoutType::Missed
  }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DailyLogRow {
  pub date: NaiveDate,
  pub workout_type: String,
  pub status: String,
  pub week_number: i64,
}

impl TryFrom<DailyLogRow> for DailyWorkoutLogEntry {
  type Error = String;

  fn try_from(row: DailyLogRow) -> Result<Self, Self::Error> {
    Ok(Self {
      date: row.date,
      workout_type: row.workout_type.parse()?,
      status: row.status.parse()?,
      week_number: row.week_number,
    })
  }
}
