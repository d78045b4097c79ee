//! Logging setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application. [`init_tracing`] is a convenience for binaries and
//! tests.

use crate::errors::{FieldguardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Output format for [`init_tracing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Plain,
    /// One JSON object per event, with the current span.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = FieldguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(FieldguardError::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Builds the filter: `RUST_LOG` when set and valid, `default_directives`
/// otherwise.
pub fn env_filter(default_directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .map_err(|e| FieldguardError::Config(format!("invalid log filter: {e}")))
}

/// Installs a global `fmt` subscriber.
///
/// Fails if the filter is invalid or a global subscriber is already set.
pub fn init_tracing(default_directives: &str, format: LogFormat) -> Result<()> {
    let filter = env_filter(default_directives)?;
    let installed = match format {
        LogFormat::Plain => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_current_span(true)
            .with_env_filter(filter)
            .try_init(),
    };
    installed.map_err(|e| FieldguardError::Config(format!("tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Plain ".parse::<LogFormat>().unwrap(), LogFormat::Plain);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Plain);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default().to_string(), "plain");
    }

    #[test]
    fn test_log_format_serde() {
        let json = serde_json::to_string(&LogFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
        let parsed: LogFormat = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(parsed, LogFormat::Plain);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing("fieldguard=debug", LogFormat::Plain);
        assert!(matches!(
            init_tracing("fieldguard=debug", LogFormat::Json),
            Err(FieldguardError::Config(_))
        ));
    }
}
