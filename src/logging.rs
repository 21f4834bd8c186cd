//! Logging setup using tracing.
//!
//! Library code only emits events; binaries call [`init`] once at startup.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Install a stderr subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: LogLevel, colored: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(colored);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        level: LogLevel,
    }

    fn parse(text: &str) -> std::result::Result<LogLevel, toml::de::Error> {
        toml::from_str::<Wrapper>(text).map(|w| w.level)
    }

    #[test]
    fn test_levels_deserialize_from_names() {
        assert_eq!(parse("level = \"debug\"").unwrap(), LogLevel::Debug);
        assert_eq!(parse("level = \"warning\"").unwrap(), LogLevel::Warn);
        assert!(parse("level = \"loud\"").is_err());
    }

    #[test]
    fn test_as_str_matches_serialized_name() {
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
        ] {
            assert_eq!(parse(&format!("level = \"{}\"", level.as_str())).unwrap(), level);
        }
    }
}
