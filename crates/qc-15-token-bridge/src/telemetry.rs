//! Tracing setup
//!
//! Installs a `tracing-subscriber` fmt layer filtered by [`LoggingConfig`].
//! Safe to call more than once; only the first call installs a subscriber.

use crate::config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The level directive could not be parsed.
    #[error("Invalid log filter {filter:?}: {reason}")]
    InvalidFilter {
        /// Directive as configured
        filter: String,
        /// Parser message
        reason: String,
    },
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, TelemetryError> {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        filter: config.level.clone(),
        reason: e.to_string(),
    })?;

    let installed = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    }
    .is_ok();

    if installed {
        tracing::info!(
            "[qc-15] Tracing initialized (level={}, json={})",
            config.level,
            config.json
        );
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig::default();
        init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }

    #[test]
    fn test_invalid_filter() {
        let config = LoggingConfig {
            level: "qc_15=loud".to_string(),
            json: false,
        };
        assert!(matches!(
            init_tracing(&config),
            Err(TelemetryError::InvalidFilter { .. })
        ));
    }
}
