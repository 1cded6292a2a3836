//! Environment-driven configuration
//!
//! Values come from the process environment after loading an optional
//! `.env` file.

use chrono_tz::Tz;
use thiserror::Error;
use url::Url;

use crate::timezone::DEFAULT_TIMEZONE;

pub const DEFAULT_SPEECH_VOICE: &str = "ash";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Invalid timezone in {var}: {value}")]
  InvalidTimezone { var: &'static str, value: String },

  #[error("Invalid URL in {var}: {value}")]
  InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
  pub endpoint: Option<Url>,
  pub api_key: Option<String>,
  pub voice: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// Explicit database URL; the desktop shell uses its app data dir otherwise
  pub database_url: Option<String>,
  pub default_timezone: Tz,
  pub speech: SpeechConfig,
  pub log_filter: String,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      database_url: None,
      default_timezone: DEFAULT_TIMEZONE,
      speech: SpeechConfig {
        endpoint: None,
        api_key: None,
        voice: DEFAULT_SPEECH_VOICE.to_string(),
      },
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

/// Non-empty value of `var`
fn env_opt(var: &str) -> Option<String> {
  std::env::var(var)
    .ok()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

impl AppConfig {
  /// Load `.env` (if any) and read configuration from the environment
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_process_env()
  }

  /// Read configuration without touching `.env`
  pub fn from_process_env() -> Result<Self, ConfigError> {
    let default_timezone = match env_opt("X3_DEFAULT_TIMEZONE") {
      Some(value) => value.parse::<Tz>().map_err(|_| ConfigError::InvalidTimezone {
        var: "X3_DEFAULT_TIMEZONE",
        value,
      })?,
      None => DEFAULT_TIMEZONE,
    };

    let endpoint = match env_opt("X3_SPEECH_ENDPOINT") {
      Some(value) => Some(Url::parse(&value).map_err(|_| ConfigError::InvalidUrl {
        var: "X3_SPEECH_ENDPOINT",
        value,
      })?),
      None => None,
    };

    Ok(Self {
      database_url: env_opt("X3_DATABASE_URL"),
      default_timezone,
      speech: SpeechConfig {
        endpoint,
        api_key: env_opt("X3_SPEECH_API_KEY"),
        voice: env_opt("X3_SPEECH_VOICE").unwrap_or_else(|| DEFAULT_SPEECH_VOICE.to_string()),
      },
      log_filter: env_opt("X3_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
    })
  }
}
