use std::{
    path::Path,
    time::{Duration, Instant},
};

use crate::{
    RunLogError,
    models::{DetectionEntry, RunRecord, ToolExecution, ToolStatus, round_seconds},
    store::{RunHandle, RunLogStore},
};

/// Mutation API for the current run's record.
///
/// Recording is best-effort: the record is always kept in memory (the exit
/// code is derived from it), and persisting is dropped for the rest of the run
/// as soon as the log store is unavailable or a write fails.
#[derive(Debug)]
pub struct Recorder {
    record: RunRecord,
    handle: Option<RunHandle>,
    started: Instant,
}

impl Recorder {
    /// Starts recording into `log_dir`, or only in memory when `log_dir` is
    /// `None` or the store cannot be set up.
    #[must_use]
    pub fn start(log_dir: Option<&Path>, record: RunRecord) -> Self {
        let Some(log_dir) = log_dir else {
            log::debug!("Run logging disabled");
            return Self::disabled(record);
        };

        match Self::try_start(log_dir, record) {
            Ok(recorder) => recorder,
            Err((e, record)) => {
                log::warn!(
                    "Run logging disabled, failed to initialize {}: {e}",
                    log_dir.display()
                );
                Self::disabled(record)
            }
        }
    }

    /// Starts recording into `log_dir`.
    ///
    /// # Errors
    ///
    /// * If the log store cannot be opened or the initial record cannot be
    ///   persisted. The record is handed back alongside the error.
    pub fn try_start(
        log_dir: &Path,
        record: RunRecord,
    ) -> Result<Self, (RunLogError, RunRecord)> {
        let started = Instant::now();

        match RunLogStore::open(log_dir).and_then(|store| store.create(&record)) {
            Ok(handle) => Ok(Self {
                record,
                handle: Some(handle),
                started,
            }),
            Err(e) => Err((e, record)),
        }
    }

    #[must_use]
    pub fn disabled(record: RunRecord) -> Self {
        Self {
            record,
            handle: None,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub const fn is_persisting(&self) -> bool {
        self.handle.is_some()
    }

    /// Path of the persisted record, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.handle.as_ref().map(RunHandle::path)
    }

    #[must_use]
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.handle.as_ref().map(RunHandle::scratch_dir)
    }

    #[must_use]
    pub const fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Sets (or replaces) the detection entry for `language`.
    pub fn record_detection(&mut self, language: &str, count: u64, pattern: &str) {
        log::debug!("record_detection: language={language} count={count} pattern={pattern}");
        let entry = DetectionEntry {
            count,
            pattern: pattern.to_string(),
        };
        self.update(|record| {
            record.detections.insert(language.to_string(), entry);
        });
    }

    /// Appends one tool execution in call order.
    pub fn record_tool(&mut self, tool: &str, status: ToolStatus, files: u64, duration: Duration) {
        log::debug!(
            "record_tool: tool={tool} status={status} files={files} duration={duration:?}"
        );
        let execution = ToolExecution::new(tool, status, files, duration);
        self.update(|record| record.tool_executions.push(execution));
    }

    /// Sets (or replaces) the excluded-file count for `directory_key`.
    pub fn record_exclusion(&mut self, directory_key: &str, count: u64) {
        log::debug!("record_exclusion: directory_key={directory_key} count={count}");
        self.update(|record| {
            record.exclusions.insert(directory_key.to_string(), count);
        });
    }

    /// `0` when every tool recorded so far succeeded, `1` otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.record.implied_exit_code()
    }

    /// Seals the record with the total duration and the final exit code.
    ///
    /// Consumes the recorder, so nothing can be recorded after sealing.
    #[must_use]
    pub fn finalize(mut self, exit_code: i32) -> RunRecord {
        let duration = round_seconds(self.started.elapsed());
        log::debug!("finalize: exit_code={exit_code} duration_sec={duration}");

        self.update(|record| {
            record.duration_seconds = Some(duration);
            record.exit_code = Some(exit_code);
        });

        self.record
    }

    fn update(&mut self, transform: impl FnOnce(&mut RunRecord)) {
        let Some(handle) = &self.handle else {
            transform(&mut self.record);
            return;
        };

        if let Err(e) = handle.update(&mut self.record, transform) {
            log::warn!(
                "Run logging disabled for the rest of the run, failed to write {}: {e}",
                handle.path().display()
            );
            self.handle = None;
        }
    }
}
