//! Structured logging setup for metagrid.
//!
//! Library code emits `tracing` events with a fixed set of field names so
//! that log aggregation can query across subsystems:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | "meta", "filter", "grid", "extra_meta", "config" |
//! | `class` | metadata class name |
//! | `view` | metadata view id |
//! | `attr` | attribute name |
//! | `ref_class` | relation target class name |
//! | `depth` | remaining relation recursion depth |
//! | `column_count` | number of columns produced |
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | A class could not be prepared and was skipped |
//! | WARN  | Degraded metadata, graceful fallback applied |
//! | INFO  | Registry built, catalog prepared |
//! | DEBUG | Derivation entry points, config choices |
//! | TRACE | Per-column and per-descendant iteration |

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::defaults;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Environment:
///   LOG_FORMAT - "json" or "text" (default: text)
///   LOG_ANSI   - "true"/"false" override ANSI colors
///   RUST_LOG   - standard env filter (default: [`defaults::LOG_FILTER`])
///
/// Calling this twice is harmless; the second install is ignored.
pub fn init_from_env() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    let ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");
    init(format, ansi);
}

/// Install the global subscriber with an explicit format.
pub fn init(format: LogFormat, ansi: Option<bool>) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| defaults::LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).try_init()
        }
    };

    if result.is_err() {
        tracing::debug!(subsystem = "logging", "Subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_log_format_display_roundtrip() {
        for format in [LogFormat::Text, LogFormat::Json] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(LogFormat::Text, Some(false));
        init(LogFormat::Json, None);
    }
}
