#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Configuration for a checkwise invocation.
//!
//! Settings come from, in increasing precedence: built-in defaults, the
//! project's `checkwise.toml`, environment variables and command line flags.

use std::path::{Path, PathBuf};

mod file;

pub use file::{CONFIG_FILE_NAME, CheckwiseConfig, ConfigError, load_config};

/// Overrides the run log directory.
pub const LOG_DIR_ENV: &str = "CHECKWISE_LOG_DIR";

/// Disables run logging when set to anything but `0`, `false` or empty.
pub const NO_RUN_LOG_ENV: &str = "CHECKWISE_NO_RUN_LOG";

/// Default run log directory, relative to the project root.
pub const DEFAULT_LOG_DIR: &str = ".checkwise/logs";

/// Settings given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub log_dir: Option<PathBuf>,
    pub no_run_log: bool,
}

/// Where run logs live and whether this run writes one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogSettings {
    pub log_dir: PathBuf,
    pub enabled: bool,
}

impl RunLogSettings {
    /// The directory to record into, or `None` if run logging is disabled.
    #[must_use]
    pub fn recording_dir(&self) -> Option<&Path> {
        self.enabled.then_some(self.log_dir.as_path())
    }
}

fn env_flag(value: Option<String>) -> bool {
    value.is_some_and(|x| {
        let x = x.trim();
        !(x.is_empty() || x == "0" || x.eq_ignore_ascii_case("false"))
    })
}

/// Resolves run log settings for the project at `root`.
///
/// `env` looks up environment variables; pass `|name| std::env::var(name).ok()`
/// outside of tests.
#[must_use]
pub fn resolve_run_log(
    root: &Path,
    config: &CheckwiseConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> RunLogSettings {
    let log_dir = cli
        .log_dir
        .clone()
        .or_else(|| env(LOG_DIR_ENV).filter(|x| !x.trim().is_empty()).map(PathBuf::from))
        .or_else(|| config.log_dir.as_ref().map(|x| root.join(x)))
        .unwrap_or_else(|| root.join(DEFAULT_LOG_DIR));

    let enabled =
        !cli.no_run_log && !env_flag(env(NO_RUN_LOG_ENV)) && config.run_log.unwrap_or(true);

    log::debug!(
        "resolve_run_log: log_dir={} enabled={enabled}",
        log_dir.display()
    );

    RunLogSettings { log_dir, enabled }
}
