use std::path::{Path, PathBuf};

use crate::models::RunRecord;

/// Every run record currently persisted in a log directory.
#[derive(Debug, Default, Clone)]
pub struct Corpus {
    pub records: Vec<RunRecord>,
    /// Files that looked like run logs but could not be read or parsed.
    pub skipped: Vec<PathBuf>,
}

impl Corpus {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Loads every `*.json` file directly inside `log_dir`.
///
/// Never fails: a missing or unreadable directory is an empty corpus, and a
/// file that does not parse is skipped. Scratch directories of runs that are
/// still in progress are ignored.
#[must_use]
pub fn load_corpus(log_dir: &Path) -> Corpus {
    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No run logs at {}", log_dir.display());
            return Corpus::default();
        }
        Err(e) => {
            log::warn!("Failed to read run logs at {}: {e}", log_dir.display());
            return Corpus::default();
        }
    };

    let mut paths = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|x| x.is_file()))
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|x| x == "json"))
        .collect::<Vec<_>>();
    paths.sort();

    let mut corpus = Corpus::default();

    for path in paths {
        match RunRecord::load(&path) {
            Ok(record) => corpus.records.push(record),
            Err(e) => {
                log::debug!("Skipping unreadable run log {}: {e}", path.display());
                corpus.skipped.push(path);
            }
        }
    }

    log::debug!(
        "Loaded {} run log(s) from {} ({} skipped)",
        corpus.records.len(),
        log_dir.display(),
        corpus.skipped.len()
    );

    corpus
}
