//! SQLite persistence for profiles, logged exercises, the daily log, rest
//! day completions, voice cue settings and the key/value cache.
//!
//! Rows are decoded into typed models here; an unknown enum value in the
//! database surfaces as `AppError::Decode`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashSet;

use crate::error::{AppError, AppResult};
use crate::models::{
  DailyLogRow, DailyWorkoutLogEntry, ExerciseLogEntry, ExerciseRow, NewExerciseLogEntry, Profile,
  TtsSettings, TtsSettingsRow,
};

// ---------------------------------------------------------------------------
/// Profiles
// ---------------------------------------------------------------------------

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> AppResult<Option<Profile>> {
  let profile = sqlx::query_as::<_, Profile>(
    "SELECT user_id, x3_start_date, timezone FROM profiles WHERE user_id = ?1",
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  Ok(profile)
}

pub async fn upsert_profile(pool: &SqlitePool, profile: &Profile) -> AppResult<()> {
  sqlx::query(
    r#"
    INSERT INTO profiles (user_id, x3_start_date, timezone)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(user_id) DO UPDATE SET
      x3_start_date = excluded.x3_start_date,
      timezone = excluded.timezone,
      updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
    "#,
  )
  .bind(&profile.user_id)
  .bind(profile.x3_start_date)
  .bind(&profile.timezone)
  .execute(pool)
  .await?;

  tracing::debug!(user_id = %profile.user_id, start = ?profile.x3_start_date, "profile saved");
  Ok(())
}

// ---------------------------------------------------------------------------
/// Exercise Log
// ---------------------------------------------------------------------------

const EXERCISE_COLUMNS: &str = "id, user_id, exercise_name, workout_type, week_number, band_color, \
  full_reps, partial_reps, notes, workout_local_date_time, created_at_utc";

fn decode_exercises(rows: Vec<ExerciseRow>) -> AppResult<Vec<ExerciseLogEntry>> {
  rows
    .into_iter()
    .map(|row| ExerciseLogEntry::try_from(row).map_err(AppError::Decode))
    .collect()
}

pub async fn insert_exercise(
  pool: &SqlitePool,
  user_id: &str,
  entry: &NewExerciseLogEntry,
  week_number: i64,
  local_date_time: NaiveDateTime,
  created_at_utc: DateTime<Utc>,
) -> AppResult<ExerciseLogEntry> {
  let result = sqlx::query(
    r#"
    INSERT INTO exercise_log (
      user_id, exercise_name, workout_type, week_number, band_color,
      full_reps, partial_reps, notes, workout_local_date_time, created_at_utc
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    "#,
  )
  .bind(user_id)
  .bind(&entry.exercise_name)
  .bind(entry.workout_type.as_str())
  .bind(week_number)
  .bind(entry.band_color.as_str())
  .bind(entry.full_reps)
  .bind(entry.partial_reps)
  .bind(&entry.notes)
  .bind(local_date_time)
  .bind(created_at_utc)
  .execute(pool)
  .await?;

  let id = result.last_insert_rowid();
  tracing::info!(
    user_id,
    id,
    exercise = %entry.exercise_name,
    band = %entry.band_color,
    full_reps = entry.full_reps,
    "exercise logged"
  );

  Ok(ExerciseLogEntry {
    id,
    user_id: user_id.to_string(),
    exercise_name: entry.exercise_name.clone(),
    workout_type: entry.workout_type,
    week_number,
    band_color: entry.band_color,
    full_reps: entry.full_reps,
    partial_reps: entry.partial_reps,
    notes: entry.notes.clone(),
    workout_local_date_time: local_date_time,
    created_at_utc,
  })
}

/// All logged sets for a user, newest first
pub async fn list_exercises(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<ExerciseLogEntry>> {
  let rows = sqlx::query_as::<_, ExerciseRow>(&format!(
    "SELECT {} FROM exercise_log WHERE user_id = ?1 ORDER BY created_at_utc DESC, id DESC",
    EXERCISE_COLUMNS
  ))
  .bind(user_id)
  .fetch_all(pool)
  .await?;

  decode_exercises(rows)
}

/// Logged sets of one exercise, newest first
pub async fn list_exercises_by_name(
  pool: &SqlitePool,
  user_id: &str,
  exercise_name: &str,
) -> AppResult<Vec<ExerciseLogEntry>> {
  let rows = sqlx::query_as::<_, ExerciseRow>(&format!(
    "SELECT {} FROM exercise_log WHERE user_id = ?1 AND exercise_name = ?2 \
     ORDER BY created_at_utc DESC, id DESC",
    EXERCISE_COLUMNS
  ))
  .bind(user_id)
  .bind(exercise_name)
  .fetch_all(pool)
  .await?;

  decode_exercises(rows)
}

pub async fn count_exercises(pool: &SqlitePool, user_id: &str) -> AppResult<i64> {
  let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM exercise_log WHERE user_id = ?1")
    .bind(user_id)
    .fetch_one(pool)
    .await?;

  Ok(count)
}

// ---------------------------------------------------------------------------
/// Daily Workout Log
// ---------------------------------------------------------------------------

pub async fn upsert_daily_log(
  pool: &SqlitePool,
  user_id: &str,
  entry: &DailyWorkoutLogEntry,
) -> AppResult<()> {
  sqlx::query(
    r#"
    INSERT INTO daily_workout_log (user_id, date, workout_type, status, week_number)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(user_id, date) DO UPDATE SET
      workout_type = excluded.workout_type,
      status = excluded.status,
      week_number = excluded.week_number
    "#,
  )
  .bind(user_id)
  .bind(entry.date)
  .bind(entry.workout_type.as_str())
  .bind(entry.status.as_str())
  .bind(entry.week_number)
  .execute(pool)
  .await?;

  Ok(())
}

/// Replace the whole daily log for a user in one transaction
pub async fn replace_daily_log(
  pool: &SqlitePool,
  user_id: &str,
  entries: &[DailyWorkoutLogEntry],
) -> AppResult<()> {
  let mut tx = pool.begin().await?;

  sqlx::query("DELETE FROM daily_workout_log WHERE user_id = ?1")
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

  for entry in entries {
    sqlx::query(
      "INSERT INTO daily_workout_log (user_id, date, workout_type, status, week_number) \
       VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(user_id)
    .bind(entry.date)
    .bind(entry.workout_type.as_str())
    .bind(entry.status.as_str())
    .bind(entry.week_number)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;

  tracing::info!(user_id, entries = entries.len(), "daily log rebuilt");
  Ok(())
}

/// Daily log rows in `[from, to]`, oldest first
pub async fn list_daily_log(
  pool: &SqlitePool,
  user_id: &str,
  from: NaiveDate,
  to: NaiveDate,
) -> AppResult<Vec<DailyWorkoutLogEntry>> {
  let rows = sqlx::query_as::<_, DailyLogRow>(
    r#"
    SELECT date, workout_type, status, week_number
    FROM daily_workout_log
    WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
    ORDER BY date ASC
    "#,
  )
  .bind(user_id)
  .bind(from)
  .bind(to)
  .fetch_all(pool)
  .await?;

  rows
    .into_iter()
    .map(|row| DailyWorkoutLogEntry::try_from(row).map_err(AppError::Decode))
    .collect()
}

// ---------------------------------------------------------------------------
/// Rest Day Completions
// ---------------------------------------------------------------------------

/// Record that the user marked `date` as a completed rest day
pub async fn insert_rest_completion(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  completed_at_utc: DateTime<Utc>,
) -> AppResult<()> {
  sqlx::query(
    r#"
    INSERT INTO rest_day_completions (user_id, date, completed_at_utc)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(user_id, date) DO NOTHING
    "#,
  )
  .bind(user_id)
  .bind(date)
  .bind(completed_at_utc)
  .execute(pool)
  .await?;

  Ok(())
}

/// Dates that count as done for the schedule: every day with a logged
/// exercise plus every rest day the user completed.
///
/// Daily log rows are derived from this set and never feed back into it.
pub async fn completed_dates(pool: &SqlitePool, user_id: &str) -> AppResult<HashSet<NaiveDate>> {
  let mut dates: HashSet<NaiveDate> = list_exercises(pool, user_id)
    .await?
    .iter()
    .map(|e| e.local_date())
    .collect();

  let rest_days: Vec<NaiveDate> =
    sqlx::query_scalar("SELECT date FROM rest_day_completions WHERE user_id = ?1")
      .bind(user_id)
      .fetch_all(pool)
      .await?;

  dates.extend(rest_days);
  Ok(dates)
}

// ---------------------------------------------------------------------------
/// Voice Cue Settings
// ---------------------------------------------------------------------------

pub async fn get_tts_settings(pool: &SqlitePool, user_id: &str) -> AppResult<Option<TtsSettings>> {
  let row = sqlx::query_as::<_, TtsSettingsRow>(
    "SELECT tts_enabled, tts_voice, tts_speed, tts_volume FROM user_ui_settings WHERE user_id = ?1",
  )
  .bind(user_id)
  .fetch_optional(pool)
  .await?;

  Ok(row.map(TtsSettings::from))
}

pub async fn upsert_tts_settings(
  pool: &SqlitePool,
  user_id: &str,
  settings: &TtsSettings,
) -> AppResult<()> {
  sqlx::query(
    r#"
    INSERT INTO user_ui_settings (user_id, tts_enabled, tts_voice, tts_speed, tts_volume)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(user_id) DO UPDATE SET
      tts_enabled = excluded.tts_enabled,
      tts_voice = excluded.tts_voice,
      tts_speed = excluded.tts_speed,
      tts_volume = excluded.tts_volume,
      updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
    "#,
  )
  .bind(user_id)
  .bind(settings.enabled)
  .bind(&settings.voice)
  .bind(f64::from(settings.speed))
  .bind(f64::from(settings.volume))
  .execute(pool)
  .await?;

  tracing::debug!(user_id, enabled = settings.enabled, "voice cue settings saved");
  Ok(())
}

// ---------------------------------------------------------------------------
/// Key/Value Cache
// ---------------------------------------------------------------------------

pub async fn kv_get(pool: &SqlitePool, key: &str) -> AppResult<Option<String>> {
  let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_cache WHERE key = ?1")
    .bind(key)
    .fetch_optional(pool)
    .await?;

  Ok(value)
}

pub async fn kv_set(pool: &SqlitePool, key: &str, value: &str) -> AppResult<()> {
  sqlx::query(
    r#"
    INSERT INTO kv_cache (key, value) VALUES (?1, ?2)
    ON CONFLICT(key) DO UPDATE SET
      value = excluded.value,
      updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
    "#,
  )
  .bind(key)
  .bind(value)
  .execute(pool)
  .await?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{BandColor, LogStatus, LoggedWorkoutType, WorkoutType};
  use crate::test_utils::{setup_test_db, teardown_test_db};
  use chrono::TimeZone;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  fn new_entry(name: &str, workout_type: WorkoutType, band: BandColor) -> NewExerciseLogEntry {
    NewExerciseLogEntry {
      exercise_name: name.to_string(),
      workout_type,
      band_color: band,
      full_reps: 20,
      partial_reps: 5,
      notes: None,
    }
  }

  #[tokio::test]
  async fn test_profile_upsert_and_fetch() {
    let pool = setup_test_db().await;

    assert!(get_profile(&pool, "user-1").await.unwrap().is_none());

    let mut profile = Profile {
      user_id: "user-1".to_string(),
      x3_start_date: Some(d("2025-06-02")),
      timezone: Some("America/New_York".to_string()),
    };
    upsert_profile(&pool, &profile).await.unwrap();

    profile.x3_start_date = Some(d("2025-06-09"));
    upsert_profile(&pool, &profile).await.unwrap();

    let loaded = get_profile(&pool, "user-1").await.unwrap().unwrap();
    assert_eq!(loaded, profile);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_exercises_round_trip_through_rows() {
    let pool = setup_test_db().await;

    let local = d("2025-06-02").and_hms_opt(7, 30, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2025, 6, 2, 12, 30, 0).unwrap();
    let later = Utc.with_ymd_and_hms(2025, 6, 2, 12, 35, 0).unwrap();

    insert_exercise(&pool, "user-1", &new_entry("Chest Press", WorkoutType::Push, BandColor::White), 1, local, earlier)
      .await
      .unwrap();
    insert_exercise(&pool, "user-1", &new_entry("Overhead Press", WorkoutType::Push, BandColor::LightGray), 1, local, later)
      .await
      .unwrap();
    insert_exercise(&pool, "user-2", &new_entry("Deadlift", WorkoutType::Pull, BandColor::Elite), 1, local, later)
      .await
      .unwrap();

    let all = list_exercises(&pool, "user-1").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].exercise_name, "Overhead Press");
    assert_eq!(all[0].band_color, BandColor::LightGray);
    assert_eq!(all[0].workout_local_date_time, local);
    assert_eq!(all[1].created_at_utc, earlier);

    let presses = list_exercises_by_name(&pool, "user-1", "Chest Press").await.unwrap();
    assert_eq!(presses.len(), 1);
    assert_eq!(count_exercises(&pool, "user-2").await.unwrap(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_unknown_band_in_database_is_decode_error() {
    let pool = setup_test_db().await;

    sqlx::query(
      "INSERT INTO exercise_log (user_id, exercise_name, workout_type, week_number, band_color, \
       full_reps, partial_reps, workout_local_date_time, created_at_utc) \
       VALUES ('user-1', 'Chest Press', 'Push', 1, 'Purple', 10, 0, '2025-06-02 07:00:00', '2025-06-02T12:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = list_exercises(&pool, "user-1").await.unwrap_err();
    assert!(matches!(err, AppError::Decode(_)));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_completed_dates_merge_exercises_and_rest_days() {
    let pool = setup_test_db().await;
    let created = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();

    insert_exercise(
      &pool,
      "user-1",
      &new_entry("Chest Press", WorkoutType::Push, BandColor::White),
      1,
      d("2025-06-02").and_hms_opt(7, 0, 0).unwrap(),
      created,
    )
    .await
    .unwrap();

    insert_rest_completion(&pool, "user-1", d("2025-06-04"), created).await.unwrap();
    insert_rest_completion(&pool, "user-1", d("2025-06-04"), created).await.unwrap();

    // Derived rows, including ones that look completed, are not a source
    let derived = DailyWorkoutLogEntry {
      date: d("2025-06-03"),
      workout_type: LoggedWorkoutType::Rest,
      status: LogStatus::Completed,
      week_number: 1,
    };
    upsert_daily_log(&pool, "user-1", &derived).await.unwrap();

    let dates = completed_dates(&pool, "user-1").await.unwrap();
    assert_eq!(dates, [d("2025-06-02"), d("2025-06-04")].into_iter().collect());

    let log = list_daily_log(&pool, "user-1", d("2025-06-01"), d("2025-06-30")).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].date, d("2025-06-03"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_tts_settings_round_trip() {
    let pool = setup_test_db().await;

    assert!(get_tts_settings(&pool, "user-1").await.unwrap().is_none());

    let mut settings = TtsSettings {
      enabled: false,
      voice: Some("nova".to_string()),
      speed: 1.25,
      volume: 0.5,
    };
    upsert_tts_settings(&pool, "user-1", &settings).await.unwrap();

    settings.enabled = true;
    upsert_tts_settings(&pool, "user-1", &settings).await.unwrap();

    let loaded = get_tts_settings(&pool, "user-1").await.unwrap().unwrap();
    assert_eq!(loaded, settings);
    assert!(get_tts_settings(&pool, "user-2").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_replace_daily_log_overwrites_rows() {
    let pool = setup_test_db().await;

    let entry = |date: &str, workout_type| DailyWorkoutLogEntry {
      date: d(date),
      workout_type,
      status: LogStatus::Completed,
      week_number: 1,
    };

    replace_daily_log(&pool, "user-1", &[entry("2025-06-02", LoggedWorkoutType::Missed)])
      .await
      .unwrap();
    replace_daily_log(
      &pool,
      "user-1",
      &[entry("2025-06-02", LoggedWorkoutType::Push), entry("2025-06-03", LoggedWorkoutType::Pull)],
    )
    .await
    .unwrap();

    let log = list_daily_log(&pool, "user-1", d("2025-06-01"), d("2025-06-30")).await.unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].workout_type, LoggedWorkoutType::Push);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_kv_cache_overwrites() {
    let pool = setup_test_db().await;

    assert_eq!(kv_get(&pool, "ash_abc").await.unwrap(), None);
    kv_set(&pool, "ash_abc", "one").await.unwrap();
    kv_set(&pool, "ash_abc", "two").await.unwrap();
    assert_eq!(kv_get(&pool, "ash_abc").await.unwrap().as_deref(), Some("two"));

    teardown_test_db(pool).await;
  }
}
