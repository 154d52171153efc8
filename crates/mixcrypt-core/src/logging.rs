//! Tracing subscriber setup
//!
//! The library crates only emit `tracing` events; applications embedding them
//! (and the integration tests) install a subscriber through here.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    /// Parse a config value; anything other than "json" is text.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Install a global subscriber. `RUST_LOG` overrides `level` when set.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(level: &str, format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    };
    result.is_ok()
}

/// Install a subscriber from the `[log]` config section.
pub fn init_from_config(config: &LogConfig) -> bool {
    init_logging(&config.level, LogFormat::parse(&config.format))
}
