//! Application error type shared by the store, tracker and commands

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Program start date is locked to {current} once exercises are logged")]
  StartDateLocked { current: NaiveDate },

  #[error("Failed to decode stored row: {0}")]
  Decode(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Errors cross the IPC boundary as their display string
impl Serialize for AppError {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_serializes_as_message() {
    let err = AppError::NotFound("profile for user-1".to_string());
    let json = serde_json::to_string(&err).unwrap();
    assert_eq!(json, "\"Not found: profile for user-1\"");
  }

  #[test]
  fn test_start_date_locked_message() {
    let err = AppError::StartDateLocked {
      current: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    };
    assert!(err.to_string().contains("2025-06-02"));
  }
}
