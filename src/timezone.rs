//! Timezone helpers
//!
//! The schedule works on calendar dates in the user's own timezone. These
//! helpers turn instants and stored timestamps into those dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Used when a profile carries no timezone
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Chicago;

/// Calendar date of `now` in `tz`
pub fn user_today(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
  now.with_timezone(&tz).date_naive()
}

/// Wall-clock time of `now` in `tz`
pub fn local_now(now: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
  now.with_timezone(&tz).naive_local()
}

/// Resolve the local wall-clock time of a stored or user-entered timestamp.
///
/// Accepts RFC 3339 (converted into `tz`), a naive `YYYY-MM-DDTHH:MM:SS`
/// (already local), or a bare `YYYY-MM-DD` (local midnight).
pub fn local_datetime_from_timestamp(timestamp: &str, tz: Tz) -> Option<NaiveDateTime> {
  let trimmed = timestamp.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
    return Some(dt.with_timezone(&tz).naive_local());
  }

  if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
    return Some(naive);
  }

  NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  #[test]
  fn test_user_today_differs_from_utc_date_late_evening() {
    // 03:30 UTC on June 2 is still June 1 in Chicago (UTC-5)
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 3, 30, 0).unwrap();
    assert_eq!(user_today(now, DEFAULT_TIMEZONE), d("2025-06-01"));
    assert_eq!(user_today(now, chrono_tz::UTC), d("2025-06-02"));
  }

  fn local_date(timestamp: &str) -> Option<NaiveDate> {
    local_datetime_from_timestamp(timestamp, DEFAULT_TIMEZONE).map(|dt| dt.date())
  }

  #[test]
  fn test_rfc3339_timestamp_is_converted() {
    assert_eq!(local_date("2025-06-02T02:00:00Z"), Some(d("2025-06-01")));
  }

  #[test]
  fn test_naive_timestamp_is_already_local() {
    let dt = local_datetime_from_timestamp("2025-06-02T02:00:00", DEFAULT_TIMEZONE).unwrap();
    assert_eq!(dt, d("2025-06-02").and_hms_opt(2, 0, 0).unwrap());
  }

  #[test]
  fn test_unparseable_timestamps_are_rejected() {
    assert_eq!(local_date("yesterday"), None);
    assert_eq!(local_date("2025-06-02 07:15"), None);
  }

  #[test]
  fn test_local_now_follows_timezone() {
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 3, 30, 0).unwrap();
    assert_eq!(local_now(now, DEFAULT_TIMEZONE), d("2025-06-01").and_hms_opt(22, 30, 0).unwrap());
  }

  #[test]
  fn test_bare_date_resolves_to_local_midnight() {
    let dt = local_datetime_from_timestamp("2025-06-02", DEFAULT_TIMEZONE).unwrap();
    assert_eq!(dt, d("2025-06-02").and_hms_opt(0, 0, 0).unwrap());
  }
}
