//! Voice cue commands and the webview speech port

use serde::Serialize;
use std::sync::Arc;
use tauri::{AppHandle, Emitter, Runtime, State};

use crate::db::AppState;
use crate::models::TtsSettings;
use crate::speech::{SpeechContext, SpeechOutcome, SpeechSynthesisPort};
use crate::tracker;

pub const SPEAK_EVENT: &str = "speech://speak";

#[derive(Debug, Clone, Serialize)]
struct SpeakPayload<'a> {
  text: &'a str,
  rate: f32,
}

/// Forwards text to the webview, which speaks it with the Web Speech API
pub struct WebviewSpeechPort<R: Runtime> {
  app: AppHandle<R>,
}

impl<R: Runtime> WebviewSpeechPort<R> {
  pub fn new(app: AppHandle<R>) -> Self {
    Self { app }
  }
}

impl<R: Runtime> SpeechSynthesisPort for WebviewSpeechPort<R> {
  fn is_available(&self) -> bool {
    true
  }

  fn speak(&self, text: &str, rate: f32) -> Result<(), String> {
    self
      .app
      .emit(SPEAK_EVENT, SpeakPayload { text, rate })
      .map_err(|e| e.to_string())
  }
}

#[tauri::command]
pub async fn speak(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  text: String,
  context: Option<SpeechContext>,
) -> Result<SpeechOutcome, String> {
  tracker::speak_cue(
    &state.db,
    &state.speech,
    &user_id,
    text,
    context.unwrap_or_default(),
    &state.config.speech.voice,
  )
  .await
  .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_tts_settings(
  state: State<'_, Arc<AppState>>,
  user_id: String,
) -> Result<TtsSettings, String> {
  tracker::tts_settings(&state.db, &user_id)
    .await
    .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn update_tts_settings(
  state: State<'_, Arc<AppState>>,
  user_id: String,
  settings: TtsSettings,
) -> Result<TtsSettings, String> {
  tracker::update_tts_settings(&state.db, &user_id, settings)
    .await
    .map_err(|e| e.to_string())
}
