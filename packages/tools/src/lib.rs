#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! External tool catalogue and execution.
//!
//! Checkwise is an orchestrator: it never interprets what a tool prints.
//! Each invocation is reduced to "did it exit cleanly", which the tool's
//! [`ToolFamily`] maps to a recorded [`ToolStatus`].

use std::path::Path;

pub use checkwise_run_log::ToolStatus;

mod executor;
mod registry;

pub use executor::{Invocation, ProcessExecutor, ToolError, ToolExecutor};
pub use registry::{BUILTIN_TOOLS, find_tool};

/// How a tool's exit status is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFamily {
    /// Rewrites files. A non-zero exit means "changed something", so the
    /// run always counts as done.
    Formatter,
    /// Pass/fail linters and type checkers.
    Checker,
    /// Dependency and security auditors.
    Auditor,
}

impl ToolFamily {
    #[must_use]
    pub const fn status_for(self, success: bool) -> ToolStatus {
        match (self, success) {
            (Self::Formatter, _) => ToolStatus::Done,
            (Self::Checker | Self::Auditor, true) => ToolStatus::Ok,
            (Self::Checker, false) => ToolStatus::Issues,
            (Self::Auditor, false) => ToolStatus::Vulnerabilities,
        }
    }
}

impl std::fmt::Display for ToolFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Formatter => "formatter",
            Self::Checker => "checker",
            Self::Auditor => "auditor",
        })
    }
}

/// Definition of one external check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Identifier recorded in run logs, e.g. `ruff:check`.
    pub name: &'static str,
    pub binary: &'static str,
    pub args: &'static [&'static str],
    pub family: ToolFamily,
    /// Detection languages this tool runs for.
    pub languages: &'static [&'static str],
    /// File that must exist in the project root for the tool to apply.
    pub requires: Option<&'static str>,
    /// Whether the detected files are appended to the arguments.
    pub pass_files: bool,
}

impl Tool {
    #[must_use]
    pub fn handles(&self, language: &str) -> bool {
        self.languages.contains(&language)
    }

    /// Whether the tool's marker file (if any) is present under `root`.
    #[must_use]
    pub fn requirement_met(&self, root: &Path) -> bool {
        self.requires.is_none_or(|file| root.join(file).is_file())
    }
}
