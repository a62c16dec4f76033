use std::path::Path;

use crate::RunLogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The log directory existed and was removed along with `files` run logs.
    Cleared { files: usize },
    NothingToClear,
}

impl ClearOutcome {
    #[must_use]
    pub const fn deleted_anything(self) -> bool {
        matches!(self, Self::Cleared { .. })
    }
}

/// Deletes the whole log directory.
///
/// Clearing a directory that does not exist is not an error.
///
/// # Errors
///
/// * If the directory exists but cannot be removed
pub fn clear_all(log_dir: &Path) -> Result<ClearOutcome, RunLogError> {
    let files = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|x| x == "json"))
            .count(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("clear_all: nothing at {}", log_dir.display());
            return Ok(ClearOutcome::NothingToClear);
        }
        Err(e) => return Err(e.into()),
    };

    match std::fs::remove_dir_all(log_dir) {
        Ok(()) => {
            log::debug!("clear_all: removed {} ({files} run logs)", log_dir.display());
            Ok(ClearOutcome::Cleared { files })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClearOutcome::NothingToClear),
        Err(e) => Err(e.into()),
    }
}
