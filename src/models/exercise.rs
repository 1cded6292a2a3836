use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::WorkoutType;

/// Resistance bands ordered from lightest to heaviest.
///
/// The derived `Ord` follows declaration order, so comparisons between bands
/// are strength comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BandColor {
  #[serde(rename = "Ultra Light")]
  UltraLight,
  White,
  #[serde(rename = "Light Gray")]
  LightGray,
  #[serde(rename = "Dark Gray")]
  DarkGray,
  Black,
  Elite,
}

impl BandColor {
  pub const ALL: [BandColor; 6] = [
    BandColor::UltraLight,
    BandColor::White,
    BandColor::LightGray,
    BandColor::DarkGray,
    BandColor::Black,
    BandColor::Elite,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      BandColor::UltraLight => "Ultra Light",
      BandColor::White => "White",
      BandColor::LightGray => "Light Gray",
      BandColor::DarkGray => "Dark Gray",
      BandColor::Black => "Black",
      BandColor::Elite => "Elite",
    }
  }

  /// Next heavier band, if any
  pub fn heavier(&self) -> Option<BandColor> {
    let idx = Self::ALL.iter().position(|b| b == self)?;
    Self::ALL.get(idx + 1).copied()
  }
}

impl std::fmt::Display for BandColor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for BandColor {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .find(|b| b.as_str() == s)
      .copied()
      .ok_or_else(|| format!("Unknown band color: {}", s))
  }
}

/// One logged exercise set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLogEntry {
  pub id: i64,
  pub user_id: String,
  pub exercise_name: String,
  pub workout_type: WorkoutType,
  pub week_number: i64,
  pub band_color: BandColor,
  pub full_reps: i64,
  pub partial_reps: i64,
  pub notes: Option<String>,
  /// Wall-clock time in the user's timezone when the set was performed
  pub workout_local_date_time: NaiveDateTime,
  pub created_at_utc: DateTime<Utc>,
}

impl ExerciseLogEntry {
  pub fn local_date(&self) -> NaiveDate {
    self.workout_local_date_time.date()
  }

  pub fn total_reps(&self) -> i64 {
    self.full_reps + self.partial_reps
  }
}

/// Raw `exercise_log` row, decoded into [`ExerciseLogEntry`] right after fetch
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseRow {
  pub id: i64,
  pub user_id: String,
  pub exercise_name: String,
  pub workout_type: String,
  pub week_number: i64,
  pub band_color: String,
  pub full_reps: i64,
  pub partial_reps: i64,
  pub notes: Option<String>,
  pub workout_local_date_time: NaiveDateTime,
  pub created_at_utc: DateTime<Utc>,
}

impl TryFrom<ExerciseRow> for ExerciseLogEntry {
  type Error = String;

  fn try_from(row: ExerciseRow) -> Result<Self, Self::Error> {
    Ok(Self {
      id: row.id,
      user_id: row.user_id,
      exercise_name: row.exercise_name,
      workout_type: row.workout_type.parse()?,
      week_number: row.week_number,
      band_color: row.band_color.parse()?,
      full_reps: row.full_reps,
      partial_reps: row.partial_reps,
      notes: row.notes,
      workout_local_date_time: row.workout_local_date_time,
      created_at_utc: row.created_at_utc,
    })
  }
}

/// For inserting new exercise sets (without id, timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExerciseLogEntry {
  pub exercise_name: String,
  pub workout_type: WorkoutType,
  pub band_color: BandColor,
  pub full_reps: i64,
  pub partial_reps: i64,
  pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_band_ordering_is_strength_ordering() {
    assert!(BandColor::UltraLight < BandColor::White);
    assert!(BandColor::DarkGray > BandColor::LightGray);
    assert_eq!(BandColor::ALL.iter().max(), Some(&BandColor::Elite));
  }

  #[test]
  fn test_band_parse_and_display() {
    assert_eq!("Light Gray".parse::<BandColor>(), Ok(BandColor::LightGray));
    assert_eq!(BandColor::UltraLight.to_string(), "Ultra Light");
    assert!("Purple".parse::<BandColor>().is_err());
  }

  #[test]
  fn test_heavier_band() {
    assert_eq!(BandColor::White.heavier(), Some(BandColor::LightGray));
    assert_eq!(BandColor::Elite.heavier(), None);
  }

  #[test]
  fn test_band_serde_uses_display_names() {
    let json = serde_json::to_string(&BandColor::DarkGray).unwrap();
    assert_eq!(json, "\"Dark Gray\"");
  }

  #[test]
  fn test_row_with_unknown_band_fails_to_decode() {
    let row = ExerciseRow {
      id: 1,
      user_id: "u1".to_string(),
      exercise_name: "Chest Press".to_string(),
      workout_type: "Push".to_string(),
      week_number: 1,
      band_color: "Neon".to_string(),
      full_reps: 20,
      partial_reps: 5,
      notes: None,
      workout_local_date_time: NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(7, 30, 0)
        .unwrap(),
      created_at_utc: Utc::now(),
    };

    let err = ExerciseLogEntry::try_from(row).unwrap_err();
    assert!(err.contains("Neon"));
  }
}
