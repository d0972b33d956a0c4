pub use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

pub fn init_logger() {
  let format = fmt::format()
    .with_source_location(false)
    .with_line_number(false)
    .with_thread_names(true)
    .with_target(true)
    .with_level(true)
    .compact();
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
  tracing_subscriber::fmt().event_format(format).with_env_filter(filter).init();
}

/// Leading characters of a token for log lines. Tokens are never logged in full.
pub fn redact(token: &str) -> String {
  let head: String = token.chars().take(8).collect();
  format!("{head}...({} chars)", token.chars().count())
}
