//! Tracing subscriber setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `filter` uses `EnvFilter` directive syntax;
/// an unparseable filter falls back to `info`. Calling this more than once
/// (or after another subscriber was installed) is a no-op.
pub fn init(filter: &str) {
  let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

  let result = tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(true))
    .try_init();

  if result.is_ok() {
    tracing::debug!(filter, "logging initialized");
  }
}
