use serde::{Deserialize, Serialize};

/// A day in the X3 program is either a Push day, a Pull day, or a Rest day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutType {
  Push,
  Pull,
  Rest,
}

impl WorkoutType {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkoutType::Push => "Push",
      WorkoutType::Pull => "Pull",
      WorkoutType::Rest => "Rest",
    }
  }

  pub fn is_rest(&self) -> bool {
    matches!(self, WorkoutType::Rest)
  }
}

impl std::fmt::Display for WorkoutType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for WorkoutType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Push" => Ok(Self::Push),
      "Pull" => Ok(Self::Pull),
      "Rest" => Ok(Self::Rest),
      _ => Err(format!("Unknown workout type: {}", s)),
    }
  }
}

/// Where a calendar day stands relative to the user's log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
  /// Logged (workout performed or rest day marked done)
  Completed,
  /// Past day with nothing logged
  Missed,
  /// Today (not yet logged) or later
  Scheduled,
  /// Precedes the program start date
  BeforeStart,
}
