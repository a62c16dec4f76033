use std::{collections::BTreeMap, path::Path, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RunLogError;

/// Unique identifier of a single invocation.
///
/// Derived from the start instant (second precision) and the process id, so
/// two processes started within the same second still get distinct ids.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(String);

impl RunId {
    #[must_use]
    pub fn new(started: DateTime<Utc>, process_id: u32) -> Self {
        Self(format!("{}_{process_id}", started.format("%Y%m%d_%H%M%S")))
    }

    #[must_use]
    pub fn for_current_process(started: DateTime<Utc>) -> Self {
        Self::new(started, std::process::id())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RunId> for String {
    fn from(value: RunId) -> Self {
        value.0
    }
}

/// How a tool execution counts toward success ratios and the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    /// Recognised by neither list. Counted toward totals, never as a success.
    Unclassified,
}

/// Completion status of one tool execution.
///
/// The checker only ever produces the four named statuses. [`Self::Other`]
/// keeps records written by other versions parseable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ToolStatus {
    Ok,
    Done,
    Issues,
    Vulnerabilities,
    Other(String),
}

impl ToolStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ok => "ok",
            Self::Done => "done",
            Self::Issues => "issues",
            Self::Vulnerabilities => "vulnerabilities",
            Self::Other(other) => other,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        match self {
            Self::Ok | Self::Done => Outcome::Success,
            Self::Issues | Self::Vulnerabilities => Outcome::Failure,
            Self::Other(_) => Outcome::Unclassified,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome(), Outcome::Success)
    }
}

impl From<String> for ToolStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ok" => Self::Ok,
            "done" => Self::Done,
            "issues" => Self::Issues,
            "vulnerabilities" => Self::Vulnerabilities,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ToolStatus {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<ToolStatus> for String {
    fn from(value: ToolStatus) -> Self {
        match value {
            ToolStatus::Other(other) => other,
            status => status.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEntry {
    pub count: u64,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecution {
    pub tool: String,
    pub status: ToolStatus,
    pub files: u64,
    #[serde(rename = "duration_sec")]
    pub duration_seconds: f64,
}

impl ToolExecution {
    #[must_use]
    pub fn new(tool: impl Into<String>, status: ToolStatus, files: u64, duration: Duration) -> Self {
        Self {
            tool: tool.into(),
            status,
            files,
            duration_seconds: round_seconds(duration),
        }
    }
}

/// Telemetry document for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub project: String,
    #[serde(rename = "cwd")]
    pub working_directory: String,
    #[serde(rename = "detection", default)]
    pub detections: BTreeMap<String, DetectionEntry>,
    #[serde(rename = "tools", default)]
    pub tool_executions: Vec<ToolExecution>,
    #[serde(default)]
    pub exclusions: BTreeMap<String, u64>,
    #[serde(rename = "duration_sec", default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

impl RunRecord {
    #[must_use]
    pub fn new(
        run_id: RunId,
        timestamp: DateTime<Utc>,
        project: impl Into<String>,
        working_directory: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            timestamp,
            project: project.into(),
            working_directory: working_directory.into(),
            detections: BTreeMap::new(),
            tool_executions: vec![],
            exclusions: BTreeMap::new(),
            duration_seconds: None,
            exit_code: None,
        }
    }

    /// Reads one persisted record.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read
    /// * If the file is not a valid run record
    pub fn load(path: &Path) -> Result<Self, RunLogError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.exit_code.is_some()
    }

    /// Exit code implied by the recorded tool executions: `0` when every one
    /// of them succeeded, `1` otherwise.
    #[must_use]
    pub fn implied_exit_code(&self) -> i32 {
        i32::from(!self.tool_executions.iter().all(|x| x.status.is_success()))
    }
}

/// Durations are kept at millisecond precision.
#[must_use]
pub fn round_seconds(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;
    use pretty_assertions::assert_eq;

    use super::*;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    }

    #[test_log::test]
    fn run_id_combines_timestamp_and_process_id() {
        assert_eq!(RunId::new(started(), 4242).as_str(), "20260314_092653_4242");
    }

    #[test_log::test]
    fn run_ids_in_the_same_second_differ_by_process() {
        assert_ne!(RunId::new(started(), 1), RunId::new(started(), 2));
    }

    #[test_log::test]
    fn status_classification() {
        assert_eq!(ToolStatus::from("ok").outcome(), Outcome::Success);
        assert_eq!(ToolStatus::from("done").outcome(), Outcome::Success);
        assert_eq!(ToolStatus::from("issues").outcome(), Outcome::Failure);
        assert_eq!(
            ToolStatus::from("vulnerabilities").outcome(),
            Outcome::Failure
        );
        assert_eq!(ToolStatus::from("skipped").outcome(), Outcome::Unclassified);
        assert_eq!(ToolStatus::from("OK").outcome(), Outcome::Unclassified);
    }

    #[test_log::test]
    fn unknown_status_survives_serialization() {
        let execution = ToolExecution::new(
            "mypy",
            ToolStatus::from("skipped"),
            2,
            Duration::from_millis(1500),
        );

        let json = serde_json::to_value(&execution).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "tool": "mypy",
                "status": "skipped",
                "files": 2,
                "duration_sec": 1.5,
            })
        );

        let parsed: ToolExecution = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.status, ToolStatus::Other("skipped".to_string()));
    }

    #[test_log::test]
    fn fresh_record_serializes_every_field() {
        let record = RunRecord::new(RunId::new(started(), 7), started(), "demo", "/tmp/demo");
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        let mut keys = object.keys().map(String::as_str).collect::<Vec<_>>();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "cwd",
                "detection",
                "duration_sec",
                "exclusions",
                "exit_code",
                "project",
                "run_id",
                "timestamp",
                "tools",
            ]
        );
        assert!(object["duration_sec"].is_null());
        assert!(object["exit_code"].is_null());
        assert_eq!(object["tools"], serde_json::json!([]));
    }

    #[test_log::test]
    fn implied_exit_code_requires_every_tool_to_succeed() {
        let mut record = RunRecord::new(RunId::new(started(), 7), started(), "demo", "/tmp/demo");
        assert_eq!(record.implied_exit_code(), 0);

        record
            .tool_executions
            .push(ToolExecution::new("ruff:format", ToolStatus::Done, 3, Duration::ZERO));
        assert_eq!(record.implied_exit_code(), 0);

        record.tool_executions.push(ToolExecution::new(
            "ruff:check",
            ToolStatus::Issues,
            3,
            Duration::ZERO,
        ));
        assert_eq!(record.implied_exit_code(), 1);
    }

    #[test_log::test]
    fn durations_are_rounded_to_milliseconds() {
        assert!((round_seconds(Duration::from_micros(1_234_567)) - 1.235).abs() < f64::EPSILON);
    }
}
