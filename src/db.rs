use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::speech::SpeechChain;

pub type DbPool = SqlitePool;

/// Application state shared with the desktop command handlers
pub struct AppState {
  pub db: DbPool,
  pub config: AppConfig,
  pub speech: SpeechChain,
}

/// Open a pool for `db_url` and bring the schema up to date
pub async fn connect(db_url: &str) -> AppResult<DbPool> {
  // An in-memory database exists per connection, so keep it on one
  let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };

  let pool = SqlitePoolOptions::new()
    .max_connections(max_connections)
    .connect(db_url)
    .await?;

  sqlx::migrate!("./migrations").run(&pool).await?;

  tracing::info!(db_url, "database ready");

  Ok(pool)
}

/// Database file under the app data dir:
/// ~/Library/Application Support/<identifier>/x3-momentum.db on macOS
#[cfg(feature = "desktop")]
fn get_db_path<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
  use tauri::Manager;

  let data_dir = app
    .path()
    .app_data_dir()
    .map_err(|e| format!("Failed to get app data dir: {}", e))?;

  std::fs::create_dir_all(&data_dir)?;

  Ok(data_dir.join("x3-momentum.db"))
}

/// Connect using the configured URL, or the app data dir when none is set
#[cfg(feature = "desktop")]
pub async fn initialize_db<R: tauri::Runtime>(
  app: &tauri::AppHandle<R>,
  config: &AppConfig,
) -> Result<DbPool, Box<dyn std::error::Error>> {
  let db_url = match &config.database_url {
    Some(url) => url.clone(),
    None => format!("sqlite://{}?mode=rwc", get_db_path(app)?.display()),
  };

  Ok(connect(&db_url).await?)
}
