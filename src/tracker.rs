//! Tracker service
//!
//! Ties the pure calculators to persisted state. Each call reads the
//! profile, resolves "today" in the user's timezone from the supplied
//! [`Clock`], and builds one [`AdjustedSchedule`] for everything it needs.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

use crate::backfill::{backfill_entries, ResetPolicy};
use crate::error::{AppError, AppResult};
use crate::history::{self, band_advance_suggestion, BandAdvice, ExerciseHistory};
use crate::models::{
  DailyWorkoutLogEntry, ExerciseLogEntry, LogStatus, LoggedWorkoutType, NewExerciseLogEntry,
  Profile, TtsSettings, WorkoutType,
};
use crate::schedule::{AdjustedDay, AdjustedSchedule, CalendarMonth};
use crate::speech::{SpeechChain, SpeechContext, SpeechOutcome, SpeechRequest};
use crate::stats::{TimeRange, UserStats};
use crate::store;
use crate::streaks::log_streak;
use crate::timezone::{local_datetime_from_timestamp, local_now, user_today};

/// The instant a call runs at, plus the timezone used for profiles without one
#[derive(Debug, Clone, Copy)]
pub struct Clock {
  pub now: DateTime<Utc>,
  pub default_tz: Tz,
}

impl Clock {
  pub fn new(now: DateTime<Utc>, default_tz: Tz) -> Self {
    Self { now, default_tz }
  }
}

/// Everything a schedule query needs about one user
struct UserView {
  profile: Option<Profile>,
  tz: Tz,
  today: NaiveDate,
  schedule: AdjustedSchedule,
}

impl UserView {
  fn start(&self) -> Option<NaiveDate> {
    self.profile.as_ref().and_then(|p| p.x3_start_date)
  }
}

async fn load_user(pool: &SqlitePool, user_id: &str, clock: &Clock) -> AppResult<UserView> {
  let profile = store::get_profile(pool, user_id).await?;
  let tz = profile
    .as_ref()
    .map(|p| p.tz_or(clock.default_tz))
    .unwrap_or(clock.default_tz);
  let today = user_today(clock.now, tz);

  let schedule = match profile.as_ref().and_then(|p| p.x3_start_date) {
    Some(start) => {
      let completed = store::completed_dates(pool, user_id).await?;
      AdjustedSchedule::new(start, today, completed)
    }
    None => AdjustedSchedule::unstarted(today),
  };

  Ok(UserView {
    profile,
    tz,
    today,
    schedule,
  })
}

// ---------------------------------------------------------------------------
/// Profile
// ---------------------------------------------------------------------------

pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> AppResult<Profile> {
  store::get_profile(pool, user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("profile for {}", user_id)))
}

/// Set (or change) the program start date and optionally the timezone.
///
/// Once any exercise is logged the start date can only be re-set to the
/// same value.
pub async fn set_program_start(
  pool: &SqlitePool,
  user_id: &str,
  start: NaiveDate,
  timezone: Option<&str>,
) -> AppResult<Profile> {
  let tz_name = match timezone {
    Some(name) => {
      let tz: Tz = name
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("unknown timezone: {}", name)))?;
      Some(tz.name().to_string())
    }
    None => None,
  };

  let existing = store::get_profile(pool, user_id).await?;

  if let Some(current) = existing.as_ref().and_then(|p| p.x3_start_date) {
    if current != start && store::count_exercises(pool, user_id).await? > 0 {
      tracing::warn!(user_id, %current, requested = %start, "start date change rejected");
      return Err(AppError::StartDateLocked { current });
    }
  }

  let profile = Profile {
    user_id: user_id.to_string(),
    x3_start_date: Some(start),
    timezone: tz_name.or_else(|| existing.and_then(|p| p.timezone)),
  };
  store::upsert_profile(pool, &profile).await?;

  tracing::info!(user_id, %start, "program start set");
  Ok(profile)
}

// ---------------------------------------------------------------------------
/// Schedule Queries
// ---------------------------------------------------------------------------

pub async fn todays_workout(pool: &SqlitePool, user_id: &str, clock: &Clock) -> AppResult<AdjustedDay> {
  let user = load_user(pool, user_id, clock).await?;
  Ok(user.schedule.today_workout())
}

pub async fn workout_for_date(
  pool: &SqlitePool,
  user_id: &str,
  date: NaiveDate,
  clock: &Clock,
) -> AppResult<AdjustedDay> {
  let user = load_user(pool, user_id, clock).await?;
  Ok(user.schedule.day(date))
}

/// Rolling window starting at `from`, or at today when `from` is None
pub async fn calendar_window(
  pool: &SqlitePool,
  user_id: &str,
  from: Option<NaiveDate>,
  clock: &Clock,
) -> AppResult<Vec<AdjustedDay>> {
  let user = load_user(pool, user_id, clock).await?;
  let from = from.unwrap_or(user.today);
  user
    .schedule
    .calendar_window(from)
    .ok_or_else(|| AppError::InvalidInput(format!("calendar window out of range: {}", from)))
}

pub async fn calendar_month(
  pool: &SqlitePool,
  user_id: &str,
  year: i32,
  month: u32,
  clock: &Clock,
) -> AppResult<CalendarMonth> {
  let user = load_user(pool, user_id, clock).await?;
  user
    .schedule
    .calendar_month(year, month)
    .ok_or_else(|| AppError::InvalidInput(format!("invalid month: {}-{}", year, month)))
}

// ---------------------------------------------------------------------------
/// Stats
// ---------------------------------------------------------------------------

/// Stats over the sets logged in `range`. The schedule position and the
/// missed count always cover the whole program.
pub async fn user_stats(
  pool: &SqlitePool,
  user_id: &str,
  range: TimeRange,
  clock: &Clock,
) -> AppResult<UserStats> {
  let user = load_user(pool, user_id, clock).await?;
  let entries: Vec<ExerciseLogEntry> = store::list_exercises(pool, user_id)
    .await?
    .into_iter()
    .filter(|e| range.contains(e.local_date(), user.today))
    .collect();

  match user.start() {
    Some(start) => {
      let completed = store::completed_dates(pool, user_id).await?;
      Ok(UserStats::compute(start, user.today, &entries, &completed))
    }
    None => {
      let mut stats = UserStats::compute(user.today, user.today, &entries, &HashSet::new());
      stats.current_week = 0;
      stats.missed_workouts = 0;
      stats.workout_status = user.schedule.today_workout();
      Ok(stats)
    }
  }
}

/// Consecutive completed daily-log days up to today
pub async fn daily_log_streak(pool: &SqlitePool, user_id: &str, clock: &Clock) -> AppResult<u32> {
  let user = load_user(pool, user_id, clock).await?;
  let Some(start) = user.start() else {
    return Ok(0);
  };

  let entries = store::list_daily_log(pool, user_id, start, user.today).await?;
  Ok(log_streak(&entries, user.today))
}

// ---------------------------------------------------------------------------
/// Logging Workouts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedExercise {
  pub entry: ExerciseLogEntry,
  pub band_advice: Option<BandAdvice>,
}

fn validate_new_exercise(entry: &NewExerciseLogEntry) -> AppResult<()> {
  if entry.exercise_name.trim().is_empty() {
    return Err(AppError::InvalidInput("exercise name is required".to_string()));
  }
  if entry.workout_type.is_rest() {
    return Err(AppError::InvalidInput("exercises belong to a Push or Pull workout".to_string()));
  }
  if entry.full_reps < 0 || entry.partial_reps < 0 {
    return Err(AppError::InvalidInput("reps cannot be negative".to_string()));
  }
  Ok(())
}

/// Record one set.
///
/// `performed_at` is a user-entered timestamp for manual entries; the clock
/// is used when it is None. The first logged set fixes the program start
/// date when none is set.
pub async fn log_exercise(
  pool: &SqlitePool,
  user_id: &str,
  entry: NewExerciseLogEntry,
  performed_at: Option<&str>,
  clock: &Clock,
) -> AppResult<LoggedExercise> {
  validate_new_exercise(&entry)?;

  let user = load_user(pool, user_id, clock).await?;

  let local_date_time = match performed_at {
    Some(ts) => local_datetime_from_timestamp(ts, user.tz)
      .ok_or_else(|| AppError::InvalidInput(format!("unreadable timestamp: {}", ts)))?,
    None => local_now(clock.now, user.tz),
  };
  let date = local_date_time.date();

  if date > user.today {
    return Err(AppError::InvalidInput(format!("{} is in the future", date)));
  }

  let schedule = match user.start() {
    Some(start) if date < start => {
      return Err(AppError::InvalidInput(format!(
        "{} is before the program start date {}",
        date, start
      )));
    }
    Some(_) => user.schedule,
    None => {
      let profile = Profile {
        user_id: user_id.to_string(),
        x3_start_date: Some(date),
        timezone: user.profile.and_then(|p| p.timezone),
      };
      store::upsert_profile(pool, &profile).await?;
      tracing::info!(user_id, start = %date, "program start set from first workout");
      AdjustedSchedule::new(date, user.today, std::iter::empty())
    }
  };

  let week_number = schedule.day(date).week;
  let saved = store::insert_exercise(pool, user_id, &entry, week_number, local_date_time, clock.now).await?;

  store::upsert_daily_log(
    pool,
    user_id,
    &DailyWorkoutLogEntry {
      date,
      workout_type: entry.workout_type.into(),
      status: LogStatus::Completed,
      week_number,
    },
  )
  .await?;

  let band_advice = band_advance_suggestion(&saved);
  if let Some(advice) = &band_advice {
    tracing::info!(
      user_id,
      exercise = %advice.exercise_name,
      next_band = %advice.next_band,
      "band advance suggested"
    );
  }

  Ok(LoggedExercise {
    entry: saved,
    band_advice,
  })
}

pub async fn exercise_history(
  pool: &SqlitePool,
  user_id: &str,
  exercise_name: &str,
  workout_type: Option<WorkoutType>,
) -> AppResult<ExerciseHistory> {
  let entries = store::list_exercises_by_name(pool, user_id, exercise_name).await?;
  Ok(history::exercise_history(exercise_name, &entries, workout_type))
}

/// Mark today's rest day as done. Fails when today is a training day.
pub async fn complete_rest_day(
  pool: &SqlitePool,
  user_id: &str,
  clock: &Clock,
) -> AppResult<DailyWorkoutLogEntry> {
  let user = load_user(pool, user_id, clock).await?;
  if user.start().is_none() {
    return Err(AppError::NotFound("program start date".to_string()));
  }

  let today = user.schedule.today_workout();
  if !today.workout_type.is_rest() {
    return Err(AppError::InvalidInput(format!(
      "today is a {} day, not a rest day",
      today.workout_type
    )));
  }

  let entry = DailyWorkoutLogEntry {
    date: user.today,
    workout_type: LoggedWorkoutType::Rest,
    status: LogStatus::Completed,
    week_number: today.week,
  };
  store::insert_rest_completion(pool, user_id, user.today, clock.now).await?;
  store::upsert_daily_log(pool, user_id, &entry).await?;

  tracing::info!(user_id, date = %user.today, "rest day completed");
  Ok(entry)
}

/// Rebuild the daily log from the start date through today
pub async fn backfill_daily_log(
  pool: &SqlitePool,
  user_id: &str,
  policy: ResetPolicy,
  clock: &Clock,
) -> AppResult<Vec<DailyWorkoutLogEntry>> {
  let user = load_user(pool, user_id, clock).await?;
  let start = user
    .start()
    .ok_or_else(|| AppError::NotFound("program start date".to_string()))?;

  // Newest first, so the first set seen on a date wins
  let mut exercise_days: HashMap<NaiveDate, WorkoutType> = HashMap::new();
  for entry in store::list_exercises(pool, user_id).await? {
    exercise_days.entry(entry.local_date()).or_insert(entry.workout_type);
  }

  let entries = backfill_entries(start, user.today, &exercise_days, policy);
  store::replace_daily_log(pool, user_id, &entries).await?;

  Ok(entries)
}

// ---------------------------------------------------------------------------
/// Voice Cues
// ---------------------------------------------------------------------------

/// Stored voice cue settings, or the defaults when the user has none
pub async fn tts_settings(pool: &SqlitePool, user_id: &str) -> AppResult<TtsSettings> {
  Ok(store::get_tts_settings(pool, user_id).await?.unwrap_or_default())
}

pub async fn update_tts_settings(
  pool: &SqlitePool,
  user_id: &str,
  settings: TtsSettings,
) -> AppResult<TtsSettings> {
  settings.validate().map_err(AppError::InvalidInput)?;
  store::upsert_tts_settings(pool, user_id, &settings).await?;
  Ok(settings)
}

/// Speak a cue with the user's voice and speed. Users who turned cues off
/// get `Skipped` without any provider being called.
pub async fn speak_cue(
  pool: &SqlitePool,
  chain: &SpeechChain,
  user_id: &str,
  text: String,
  context: SpeechContext,
  default_voice: &str,
) -> AppResult<SpeechOutcome> {
  let settings = tts_settings(pool, user_id).await?;
  if !settings.enabled || text.trim().is_empty() {
    tracing::debug!(user_id, enabled = settings.enabled, "voice cue skipped");
    return Ok(SpeechOutcome::Skipped);
  }

  let request = SpeechRequest {
    text,
    voice: settings.voice.unwrap_or_else(|| default_voice.to_string()),
    speed: settings.speed,
    user_id: user_id.to_string(),
    context,
  };

  Ok(chain.speak(&request).await)
}
