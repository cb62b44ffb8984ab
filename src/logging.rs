//! Logging initialization and configuration.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor a configured level is present.
pub const DEFAULT_FILTER: &str = "mock_pay=info,tower_http=info";

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Build a filter from a configured level or directive string.
///
/// A bare level such as `debug` applies to this crate and to request
/// tracing; anything else is taken as a full `EnvFilter` directive. Falls
/// back to the default filter if the string does not parse.
pub fn filter_for(level: &str) -> EnvFilter {
    let level = level.trim();
    let directive = match level {
        "error" | "warn" | "info" | "debug" | "trace" => {
            format!("mock_pay={level},tower_http={level}")
        }
        other => other.to_string(),
    };
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(default_filter())
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}

/// Try to initialize the logging system with an explicit level.
pub fn try_init_with_level(level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(filter_for(level))
        .with(tracing_subscriber::fmt::layer().compact())
        .try_init()
}
