#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error;

#[cfg(feature = "macros")]
mod macros;

#[cfg(feature = "macros")]
pub use macros::*;

#[cfg(not(feature = "macros"))]
pub use log;

/// Environment variable holding the log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "CHECKWISE_LOG";

#[cfg(debug_assertions)]
pub const DEFAULT_LOG_LEVEL: &str = "checkwise=trace";
#[cfg(not(debug_assertions))]
pub const DEFAULT_LOG_LEVEL: &str = "checkwise=info";

#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

/// Resolves the log filter: `CHECKWISE_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_LOG_LEVEL`].
#[must_use]
pub fn log_filter(env: impl Fn(&str) -> Option<String>) -> String {
    env(LOG_ENV)
        .or_else(|| env("RUST_LOG"))
        .filter(|x| !x.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Installs the global logger. Diagnostics go to stderr so stdout stays free
/// for reports.
///
/// # Errors
///
/// * If a global logger was already installed
pub fn init() -> Result<(), InitError> {
    let filter = log_filter(|name| std::env::var(name).ok());

    env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp_millis()
        .target(env_logger::Target::Stderr)
        .try_init()?;

    log::trace!("Logging initialized with filter '{filter}'");

    Ok(())
}
