use serde::{Deserialize, Serialize};

pub const DEFAULT_TTS_SPEED: f32 = 1.0;
pub const DEFAULT_TTS_VOLUME: f32 = 0.8;

/// Voice cue preferences for one user. `voice` of None means the
/// configured default voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtsSettings {
  pub enabled: bool,
  pub voice: Option<String>,
  pub speed: f32,
  pub volume: f32,
}

impl Default for TtsSettings {
  fn default() -> Self {
    Self {
      enabled: true,
      voice: None,
      speed: DEFAULT_TTS_SPEED,
      volume: DEFAULT_TTS_VOLUME,
    }
  }
}

impl TtsSettings {
  /// Range check for user-entered values; returns the first problem found
  pub fn validate(&self) -> Result<(), String> {
    if !(0.25..=4.0).contains(&self.speed) {
      return Err(format!("speech speed must be between 0.25 and 4.0, got {}", self.speed));
    }
    if !(0.0..=1.0).contains(&self.volume) {
      return Err(format!("speech volume must be between 0 and 1, got {}", self.volume));
    }
    if self.voice.as_deref().is_some_and(|v| v.trim().is_empty()) {
      return Err("speech voice cannot be blank".to_string());
    }
    Ok(())
  }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TtsSettingsRow {
  pub tts_enabled: bool,
  pub tts_voice: Option<String>,
  pub tts_speed: f64,
  pub tts_volume: f64,
}

impl From<TtsSettingsRow> for TtsSettings {
  fn from(row: TtsSettingsRow) -> Self {
    Self {
      enabled: row.tts_enabled,
      voice: row.tts_voice,
      speed: row.tts_speed as f32,
      volume: row.tts_volume as f32,
    }
  }
}
