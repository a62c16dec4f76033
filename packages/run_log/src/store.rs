use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use tempfile::{NamedTempFile, TempDir};

use crate::{RunLogError, models::RunRecord};

/// Prefix of the per-run scratch directories created inside the log
/// directory. Readers of the log directory skip them.
pub const SCRATCH_PREFIX: &str = ".scratch-";

/// Owns a log directory on behalf of a single run.
///
/// Each store holds a private scratch directory next to the run logs. Every
/// snapshot is written there first and then renamed over the canonical path,
/// which keeps the rename on a single filesystem. The scratch directory is
/// removed when the store is dropped.
#[derive(Debug)]
pub struct RunLogStore {
    log_dir: PathBuf,
    scratch: TempDir,
}

impl RunLogStore {
    /// # Errors
    ///
    /// * If the log directory cannot be created
    /// * If the scratch directory cannot be created
    pub fn open(log_dir: impl Into<PathBuf>) -> Result<Self, RunLogError> {
        let log_dir = log_dir.into();
        std::fs::create_dir_all(&log_dir)?;

        let scratch = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir_in(&log_dir)?;

        log::trace!(
            "Opened run log store log_dir={} scratch={}",
            log_dir.display(),
            scratch.path().display()
        );

        Ok(Self { log_dir, scratch })
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    #[must_use]
    pub fn record_path(&self, run_id: &str) -> PathBuf {
        self.log_dir.join(format!("{run_id}.json"))
    }

    /// Persists a freshly initialized record and hands out the handle used
    /// for every later update.
    ///
    /// The initial write never replaces an existing file, so two runs that
    /// somehow share an id cannot clobber each other.
    ///
    /// # Errors
    ///
    /// * If a record with the same id already exists
    /// * If the record fails to serialize or be written
    pub fn create(self, record: &RunRecord) -> Result<RunHandle, RunLogError> {
        let path = self.record_path(&record.run_id);

        self.write_snapshot(&path, record, false)?;
        log::debug!("Created run log {}", path.display());

        Ok(RunHandle { store: self, path })
    }

    fn write_snapshot(
        &self,
        path: &Path,
        record: &RunRecord,
        replace: bool,
    ) -> Result<(), RunLogError> {
        let mut file = NamedTempFile::new_in(self.scratch.path())?;
        serde_json::to_writer_pretty(&mut file, record)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;

        if replace {
            file.persist(path).map_err(|e| e.error)?;
        } else {
            file.persist_noclobber(path).map_err(|e| {
                if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                    RunLogError::AlreadyExists(path.to_path_buf())
                } else {
                    e.error.into()
                }
            })?;
        }

        Ok(())
    }
}

/// A created run log on disk.
#[derive(Debug)]
pub struct RunHandle {
    store: RunLogStore,
    path: PathBuf,
}

impl RunHandle {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn scratch_dir(&self) -> &Path {
        self.store.scratch_dir()
    }

    /// Applies `transform` to the in-memory `record` and persists the result.
    ///
    /// `record` keeps the change even when persisting fails.
    ///
    /// # Errors
    ///
    /// * If the updated record fails to serialize or be written
    pub fn update(
        &self,
        record: &mut RunRecord,
        transform: impl FnOnce(&mut RunRecord),
    ) -> Result<(), RunLogError> {
        transform(record);
        self.store.write_snapshot(&self.path, record, true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::RunId;

    fn record(pid: u32) -> RunRecord {
        let now = Utc::now();
        RunRecord::new(RunId::new(now, pid), now, "demo", "/work/demo")
    }

    #[test_log::test]
    fn create_persists_a_parseable_minimal_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = RunLogStore::open(dir.path()).unwrap();
        let record = record(1);

        let handle = store.create(&record).unwrap();

        assert_eq!(RunRecord::load(handle.path()).unwrap(), record);
    }

    #[test_log::test]
    fn update_replaces_the_persisted_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut record = record(1);
        let handle = RunLogStore::open(dir.path())
            .unwrap()
            .create(&record)
            .unwrap();

        handle
            .update(&mut record, |record| {
                record.exclusions.insert("node_modules".to_string(), 12);
            })
            .unwrap();

        let loaded = RunRecord::load(handle.path()).unwrap();
        assert_eq!(loaded.exclusions.get("node_modules"), Some(&12));
        assert_eq!(loaded, record);
    }

    #[test_log::test]
    fn create_refuses_to_overwrite_an_existing_run() {
        let dir = tempfile::tempdir().unwrap();
        let record = record(1);

        let _first = RunLogStore::open(dir.path())
            .unwrap()
            .create(&record)
            .unwrap();
        let second = RunLogStore::open(dir.path()).unwrap().create(&record);

        assert!(matches!(second, Err(RunLogError::AlreadyExists(_))));
    }

    #[test_log::test]
    fn scratch_directory_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let handle = RunLogStore::open(dir.path())
            .unwrap()
            .create(&record(1))
            .unwrap();
        let scratch = handle.scratch_dir().to_path_buf();

        assert!(scratch.is_dir());
        assert!(
            std::fs::read_dir(&scratch).unwrap().next().is_none(),
            "snapshots are renamed out of the scratch directory"
        );

        drop(handle);

        assert!(!scratch.exists());
    }
}
