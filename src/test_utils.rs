//! Test utilities and helpers for unit and database tests
//!
//! - In-memory database setup/teardown
//! - Exercise log factories
//! - Seed helpers for profiles and logged sets

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::models::{BandColor, ExerciseLogEntry, NewExerciseLogEntry, Profile, WorkoutType};
use crate::schedule::compute_nominal;
use crate::store;

// ---------------------------------------------------------------------------
/// Database Test Utilities
// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database with all migrations applied
///
/// Uses max_connections(1) so every query sees the same in-memory database
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed a profile with a start date in UTC
pub async fn seed_test_profile(pool: &SqlitePool, user_id: &str, start: NaiveDate) -> Profile {
  let profile = Profile {
    user_id: user_id.to_string(),
    x3_start_date: Some(start),
    timezone: Some("UTC".to_string()),
  };

  store::upsert_profile(pool, &profile)
    .await
    .expect("Failed to seed profile");

  profile
}

/// Log one set on each given date, using the nominal workout for that day
pub async fn seed_test_exercises(
  pool: &SqlitePool,
  user_id: &str,
  start: NaiveDate,
  dates: &[NaiveDate],
) -> Vec<ExerciseLogEntry> {
  let mut logged = Vec::new();

  for date in dates {
    let nominal = compute_nominal(start, *date);
    let entry = NewExerciseLogEntry {
      exercise_name: match nominal.workout_type {
        WorkoutType::Pull => "Deadlift".to_string(),
        _ => "Chest Press".to_string(),
      },
      workout_type: nominal.workout_type,
      band_color: BandColor::White,
      full_reps: 25,
      partial_reps: 5,
      notes: None,
    };
    let local = date.and_time(noon());
    let created = Utc.from_utc_datetime(&local);

    logged.push(
      store::insert_exercise(pool, user_id, &entry, nominal.week, local, created)
        .await
        .expect("Failed to seed exercise"),
    );
  }

  logged
}

// ---------------------------------------------------------------------------
/// Mock Data Factories
// ---------------------------------------------------------------------------

fn noon() -> NaiveTime {
  NaiveTime::from_hms_opt(12, 0, 0).expect("valid time")
}

/// A logged set created now, dated today (UTC)
pub fn mock_exercise(
  name: &str,
  workout_type: WorkoutType,
  band_color: BandColor,
  full_reps: i64,
  partial_reps: i64,
) -> ExerciseLogEntry {
  let now = Utc::now();
  ExerciseLogEntry {
    id: 0,
    user_id: "test-user".to_string(),
    exercise_name: name.to_string(),
    workout_type,
    week_number: 1,
    band_color,
    full_reps,
    partial_reps,
    notes: None,
    workout_local_date_time: now.naive_utc(),
    created_at_utc: now,
  }
}

/// A logged set performed at noon on `date`
pub fn mock_exercise_on(
  date: NaiveDate,
  name: &str,
  workout_type: WorkoutType,
  band_color: BandColor,
  full_reps: i64,
  partial_reps: i64,
) -> ExerciseLogEntry {
  let local = date.and_time(noon());
  ExerciseLogEntry {
    workout_local_date_time: local,
    created_at_utc: Utc.from_utc_datetime(&local),
    ..mock_exercise(name, workout_type, band_color, full_reps, partial_reps)
  }
}

// ---------------------------------------------------------------------------
/// Time Helpers
// ---------------------------------------------------------------------------

/// Noon UTC on `date`; a clock reading for tracker calls
pub fn utc_noon(date: NaiveDate) -> DateTime<Utc> {
  Utc.from_utc_datetime(&date.and_time(noon()))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('profiles', 'exercise_log', 'daily_workout_log', 'kv_cache', 'rest_day_completions', 'user_ui_settings')",
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 6, "Expected 6 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_exercises_follow_nominal_schedule() {
    let pool = setup_test_db().await;
    let start = d("2025-06-02");

    seed_test_profile(&pool, "user-1", start).await;
    let logged = seed_test_exercises(&pool, "user-1", start, &[d("2025-06-02"), d("2025-06-03")]).await;

    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].workout_type, WorkoutType::Push);
    assert_eq!(logged[1].workout_type, WorkoutType::Pull);
    assert_eq!(logged[1].exercise_name, "Deadlift");

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_exercise_on_uses_given_date() {
    let entry = mock_exercise_on(d("2025-06-02"), "Chest Press", WorkoutType::Push, BandColor::Black, 20, 3);
    assert_eq!(entry.local_date(), d("2025-06-02"));
    assert_eq!(entry.total_reps(), 23);
  }

  #[test]
  fn test_utc_noon_stays_on_date() {
    assert_eq!(utc_noon(d("2025-06-02")).date_naive(), d("2025-06-02"));
  }
}
