pub mod exercises;
pub mod schedule;
pub mod speech;
pub mod stats;

use chrono::Utc;

use crate::db::AppState;
use crate::tracker::Clock;

/// One clock reading per command
fn clock(state: &AppState) -> Clock {
  Clock::new(Utc::now(), state.config.default_timezone)
}
