#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Runs the formatters, linters and auditors that apply to a project and
//! records what happened in a run log.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use checkwise_config::CheckwiseConfig;
use checkwise_detect::{DetectError, Detection, Exclusion, default_exclusions};
use checkwise_run_log::{Recorder, RunId, RunRecord};
use checkwise_tools::{BUILTIN_TOOLS, Tool, ToolExecutor};
use chrono::Utc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Detect(#[from] DetectError),
}

/// What a check run looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckContext {
    pub root: PathBuf,
    pub exclusions: Vec<Exclusion>,
    /// Tool names that never run.
    pub skip_tools: Vec<String>,
}

impl CheckContext {
    /// Context with the built-in exclusions and every tool enabled.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclusions: default_exclusions(),
            skip_tools: vec![],
        }
    }

    #[must_use]
    pub fn from_config(root: impl Into<PathBuf>, config: &CheckwiseConfig) -> Self {
        let mut exclusions = if config.default_excludes.unwrap_or(true) {
            default_exclusions()
        } else {
            vec![]
        };

        for value in &config.exclude {
            let exclusion = Exclusion::parse(value);
            if !exclusions.contains(&exclusion) {
                exclusions.push(exclusion);
            }
        }

        Self {
            root: root.into(),
            exclusions,
            skip_tools: config.skip_tools.clone(),
        }
    }

    fn is_skipped(&self, tool: &Tool) -> bool {
        self.skip_tools.iter().any(|x| x == tool.name)
    }
}

/// Name recorded as the project for a run rooted at `root`.
#[must_use]
pub fn project_name(root: &Path) -> String {
    root.file_name().map_or_else(
        || root.to_string_lossy().into_owned(),
        |x| x.to_string_lossy().into_owned(),
    )
}

/// Fresh record for a run of this process over `root`.
#[must_use]
pub fn new_run_record(root: &Path) -> RunRecord {
    let started = Utc::now();
    let working_directory = std::env::current_dir().unwrap_or_else(|_| root.to_path_buf());

    RunRecord::new(
        RunId::for_current_process(started),
        started,
        project_name(root),
        working_directory.to_string_lossy(),
    )
}

/// Exit code used when a check is interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Removes `scratch` and exits with [`INTERRUPTED_EXIT_CODE`] on Ctrl-C.
///
/// Returns `false` if the handler could not be installed, for example because
/// one is already installed. The check goes on either way.
pub fn install_interrupt_cleanup(scratch: &Path) -> bool {
    let scratch = scratch.to_path_buf();

    let installed = ctrlc::set_handler(move || {
        log::debug!("Interrupted, removing {}", scratch.display());
        let _ = std::fs::remove_dir_all(&scratch);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });

    match installed {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to install the interrupt handler: {e}");
            false
        }
    }
}

/// Tools that apply to `detection`, in catalogue order.
#[must_use]
pub fn applicable_tools<'a>(
    context: &'a CheckContext,
    detection: &'a Detection,
) -> impl Iterator<Item = &'static Tool> + 'a {
    BUILTIN_TOOLS.iter().filter(move |tool| {
        tool.languages.iter().any(|x| detection.count(x) > 0)
            && !context.is_skipped(tool)
            && tool.requirement_met(&context.root)
    })
}

fn tool_files(tool: &Tool, detection: &Detection) -> Vec<PathBuf> {
    detection
        .present()
        .filter(|x| tool.handles(x.category.language))
        .flat_map(|x| x.files.iter().cloned())
        .collect()
}

/// Detects the project's files and runs every applicable tool, recording
/// each step into `recorder`.
///
/// Tool output is only printed for runs that did not succeed. The caller
/// decides the exit code from `recorder` and finalizes it.
///
/// # Errors
///
/// * If the project root cannot be scanned
pub fn run_check(
    context: &CheckContext,
    executor: &dyn ToolExecutor,
    recorder: &mut Recorder,
) -> Result<(), CheckError> {
    let detection = checkwise_detect::detect(&context.root, &context.exclusions)?;

    for language in detection.present() {
        recorder.record_detection(
            language.category.language,
            language.count(),
            &language.category.pattern_label(),
        );
    }
    for (key, count) in &detection.exclusions {
        if *count > 0 {
            recorder.record_exclusion(key, *count);
        }
    }

    if detection.is_empty() {
        println!("No supported files found in {}", context.root.display());
        return Ok(());
    }

    for tool in applicable_tools(context, &detection) {
        if !executor.is_available(tool) {
            log::warn!("Skipping {}: '{}' is not installed", tool.name, tool.binary);
            continue;
        }

        let files = tool_files(tool, &detection);
        let count = files.len() as u64;

        println!("Running {} ({}, {count} files)", tool.name, tool.family);
        let started = Instant::now();
        let result = executor.execute(tool, &context.root, &files);
        let elapsed = started.elapsed();

        let status = match result {
            Ok(invocation) => {
                let status = tool.family.status_for(invocation.success);
                checkwise_logging::debug_or_trace!(
                    ("{}: {status} ({:?})", tool.name, invocation.exit_code),
                    (
                        "{}: {status} ({:?}) output:\n{}",
                        tool.name,
                        invocation.exit_code,
                        invocation.output
                    )
                );
                if !status.is_success() && !invocation.output.trim().is_empty() {
                    println!("{}", invocation.output.trim_end());
                }
                status
            }
            Err(e) => {
                log::error!("{e}");
                tool.family.status_for(false)
            }
        };

        println!("{}: {status}", tool.name);
        recorder.record_tool(tool.name, status, count, elapsed);
    }

    Ok(())
}
