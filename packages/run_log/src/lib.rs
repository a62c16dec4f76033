#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Per-invocation run logs.
//!
//! Every `checkwise check` invocation owns exactly one [`RunRecord`], persisted
//! as `<log-dir>/<run_id>.json`. The record is created up front, mutated
//! through a [`Recorder`] while the checks run and sealed once by
//! [`Recorder::finalize`]. Other invocations only ever read whole records
//! ([`load_corpus`]) or delete the whole directory ([`clear_all`]).
//!
//! Writes go through a per-run scratch directory and are atomically renamed
//! into place, so a concurrent reader never observes a partially written
//! document.

use std::path::PathBuf;

use thiserror::Error;

mod corpus;
mod lifecycle;
mod models;
mod recorder;
mod store;

pub use corpus::{Corpus, load_corpus};
pub use lifecycle::{ClearOutcome, clear_all};
pub use models::{DetectionEntry, Outcome, RunId, RunRecord, ToolExecution, ToolStatus};
pub use recorder::Recorder;
pub use store::{RunHandle, RunLogStore, SCRATCH_PREFIX};

#[derive(Debug, Error)]
pub enum RunLogError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Run log already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}
