// src/logging.rs

//! Logging setup: `tracing` events go to STDERR through a `tracing-subscriber`
//! fmt layer.
//!
//! Filter selection:
//! 1. `--log-level` applies that level to every target.
//! 2. Otherwise `MQTTWATCH_LOG` is read as an `EnvFilter` directive string,
//!    e.g. `info` or `mqttwatch=debug,rumqttc=warn`.
//! 3. Otherwise `info`, with the MQTT client's own chatter capped at `warn`.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "MQTTWATCH_LOG";

const DEFAULT_DIRECTIVES: &str = "info,rumqttc=warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(lvl.as_str());
    }
    env.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_env() {
        let f = build_filter(Some(LogLevel::Debug), Some("error"));
        assert_eq!(f.to_string(), "debug");
    }

    #[test]
    fn env_directives_are_used_when_valid() {
        let f = build_filter(None, Some(" mqttwatch=trace "));
        assert_eq!(f.to_string(), "mqttwatch=trace");
    }

    #[test]
    fn garbage_env_falls_back_to_default() {
        let f = build_filter(None, Some("mqttwatch=loudest"));
        assert!(f.to_string().contains("rumqttc=warn"));
        assert_eq!(build_filter(None, None).to_string(), build_filter(None, Some("")).to_string());
    }
}
