//! Tracing subscriber setup for applications embedding the dictionary.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! left to the host binary or test harness.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the global subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    /// The fallback directive could not be parsed.
    #[error("invalid log directive '{directive}': {message}")]
    InvalidDirective {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("global tracing subscriber already installed")]
    AlreadyInitialized,
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive`.
///
/// Returns an error instead of panicking when a subscriber already exists.
pub fn init_logging(default_directive: &str) -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| {
            LoggingError::InvalidDirective {
                directive: default_directive.to_string(),
                message: e.to_string(),
            }
        })?,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
