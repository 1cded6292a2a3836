use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
  pub user_id: String,
  /// Day 0 of the program
  pub x3_start_date: Option<NaiveDate>,
  /// IANA timezone name, e.g. "America/Chicago"
  pub timezone: Option<String>,
}

impl Profile {
  /// Resolve the profile timezone, falling back when unset or unparseable
  pub fn tz_or(&self, fallback: Tz) -> Tz {
    self
      .timezone
      .as_deref()
      .and_then(|name| name.parse::<Tz>().ok())
      .unwrap_or(fallback)
  }
}
