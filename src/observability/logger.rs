//! Log subscriber setup
//!
//! Events go through `tracing`; this installs the process-wide subscriber.
//! `RUST_LOG` overrides the default filter.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable single line per event
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Default directive when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "storefront_blocks=debug,tower_http=debug,info"
    } else {
        "storefront_blocks=info,tower_http=info"
    }
}

/// Install the global subscriber
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logger(format: LogFormat, verbose: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .json()
                    .with_current_span(false),
            )
            .try_init(),
    };

    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_config() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default().to_string(), "compact");
    }

    #[test]
    fn test_json_subscriber_installs_once() {
        assert!(init_logger(LogFormat::Json, false));
        assert!(!init_logger(LogFormat::Compact, true));
    }

    #[test]
    fn test_default_directive_parses() {
        for verbose in [true, false] {
            assert!(default_directive(verbose).parse::<EnvFilter>().is_ok());
        }
    }
}
