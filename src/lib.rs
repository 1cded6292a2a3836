pub mod backfill;
pub mod config;
pub mod db;
pub mod error;
pub mod history;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod speech;
pub mod stats;
pub mod store;
pub mod streaks;
pub mod timezone;
pub mod tracker;

#[cfg(feature = "desktop")]
mod commands;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
  use std::sync::Arc;
  use tauri::Manager;

  use config::AppConfig;
  use db::AppState;
  use speech::{HostedSpeechProvider, PlatformSpeechProvider, SpeechChain, SpeechProvider, SqliteKeyValueStore};

  let config = match AppConfig::from_env() {
    Ok(config) => {
      logging::init(&config.log_filter);
      config
    }
    Err(e) => {
      logging::init(config::DEFAULT_LOG_FILTER);
      tracing::error!(error = %e, "invalid configuration, using defaults");
      AppConfig::default()
    }
  };

  tauri::Builder::default()
    .plugin(tauri_plugin_opener::init())
    .setup(move |app| {
      let app_handle = app.handle().clone();
      tauri::async_runtime::block_on(async move {
        match db::initialize_db(&app_handle, &config).await {
          Ok(pool) => {
            let mut providers: Vec<Box<dyn SpeechProvider>> = Vec::new();
            if let Some(hosted) = HostedSpeechProvider::from_config(&config.speech) {
              providers.push(Box::new(hosted));
            }
            providers.push(Box::new(PlatformSpeechProvider::new(
              commands::speech::WebviewSpeechPort::new(app_handle.clone()),
            )));
            let speech = SpeechChain::new(providers, Some(Arc::new(SqliteKeyValueStore::new(pool.clone()))));

            let state = Arc::new(AppState {
              db: pool,
              config,
              speech,
            });
            app_handle.manage(state);
          }
          Err(e) => {
            tracing::error!(error = %e, "failed to initialize database");
          }
        }
      });
      Ok(())
    })
    .invoke_handler(tauri::generate_handler![
      // Schedule
      commands::schedule::get_todays_workout,
      commands::schedule::get_workout_for_date,
      commands::schedule::get_calendar_window,
      commands::schedule::get_calendar_month,
      commands::schedule::complete_rest_day,
      commands::schedule::backfill_daily_log,
      commands::schedule::get_profile,
      commands::schedule::set_program_start,
      // Exercises
      commands::exercises::log_exercise,
      commands::exercises::get_exercise_history,
      // Stats
      commands::stats::get_user_stats,
      commands::stats::get_daily_log_streak,
      // Speech
      commands::speech::speak,
      commands::speech::get_tts_settings,
      commands::speech::update_tts_settings,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
