//! Tracing subscriber setup for the binary.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::LoggingError;

/// Builds the filter from `RUST_LOG` when set, otherwise from the configured
/// level. A bare level such as `debug` applies to this crate only.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return Ok(from_env);
    }
    let directive = if config.level.contains('=') || config.level.contains(',') {
        config.level.clone()
    } else {
        format!("reelmap={}", config.level)
    };
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidFilter {
        filter: directive,
        reason: e.to_string(),
    })
}

/// Installs the global subscriber and bridges `log` records into it.
///
/// Fails if a subscriber or logger is already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    match config.format {
        LogFormat::Text => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_target(true));
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
        }
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().json().with_current_span(true));
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
        }
    }

    tracing_log::LogTracer::init().map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
    Ok(())
}
