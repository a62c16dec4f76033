use std::{
    path::{Path, PathBuf},
    process::Command,
};

use thiserror::Error;

use crate::Tool;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to run '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result of running one tool to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Captured stdout followed by stderr.
    pub output: String,
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Runs external tools on behalf of the checker.
pub trait ToolExecutor {
    fn is_available(&self, tool: &Tool) -> bool;

    /// Runs `tool` in `root`. `files` are appended to the arguments for tools
    /// that take explicit file lists.
    ///
    /// # Errors
    ///
    /// * If the tool process could not be started
    fn execute(&self, tool: &Tool, root: &Path, files: &[PathBuf]) -> Result<Invocation, ToolError>;
}

/// Executes tools as child processes found on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ToolExecutor for ProcessExecutor {
    fn is_available(&self, tool: &Tool) -> bool {
        match which::which(tool.binary) {
            Ok(path) => {
                log::trace!("Tool '{}' found at {}", tool.name, path.display());
                true
            }
            Err(e) => {
                log::debug!("Tool '{}' ({}) not found: {e}", tool.name, tool.binary);
                false
            }
        }
    }

    fn execute(&self, tool: &Tool, root: &Path, files: &[PathBuf]) -> Result<Invocation, ToolError> {
        let mut command = Command::new(tool.binary);
        command.args(tool.args).current_dir(root);
        if tool.pass_files {
            command.args(files);
        }

        log::debug!("Running {}: {command:?}", tool.name);

        let output = command.output().map_err(|source| ToolError::Spawn {
            tool: tool.name.to_string(),
            source,
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(Invocation {
            output: text,
            success: output.status.success(),
            exit_code: output.status.code(),
        })
    }
}
