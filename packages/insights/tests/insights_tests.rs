use std::{path::Path, time::Duration};

use chrono::Utc;
use pretty_assertions::assert_eq;

use checkwise_insights::{Advisory, Insights, insights_for_dir};
use checkwise_run_log::{Recorder, RunId, RunRecord, ToolStatus};

fn record_run(log_dir: &Path, pid: u32, project: &str, tools: &[(&str, ToolStatus)]) {
    let now = Utc::now();
    let mut recorder = Recorder::start(
        Some(log_dir),
        RunRecord::new(RunId::new(now, pid), now, project, "/work"),
    );
    assert!(recorder.is_persisting());

    recorder.record_detection("python", 3, "*.py");
    for (tool, status) in tools {
        recorder.record_tool(tool, status.clone(), 3, Duration::from_millis(5));
    }

    let exit_code = recorder.exit_code();
    let _ = recorder.finalize(exit_code);
}

#[test_log::test]
fn corrupt_files_are_left_out_of_the_report() {
    let dir = tempfile::tempdir().unwrap();

    for pid in 1..=3 {
        record_run(dir.path(), pid, "api", &[("ruff:check", ToolStatus::Ok)]);
    }
    std::fs::write(dir.path().join("20260101_000000_9.json"), "not json at all").unwrap();

    let insights = insights_for_dir(dir.path());
    let report = insights.report().unwrap();

    assert_eq!(report.run_count, 3);
    assert_eq!(report.tool("ruff:check").unwrap().total, 3);
}

#[test_log::test]
fn single_failing_run_does_not_raise_an_advisory() {
    let dir = tempfile::tempdir().unwrap();
    record_run(dir.path(), 1, "api", &[("ruff:check", ToolStatus::Issues)]);

    let insights = insights_for_dir(dir.path());
    let report = insights.report().unwrap();
    let stats = report.tool("ruff:check").unwrap();

    assert_eq!((stats.successes, stats.total), (0, 1));
    assert!(stats.ratio.abs() < f64::EPSILON);
    assert!(report.advisories.is_empty());
    assert_eq!(report.recent[0].exit_code, Some(1));
}

#[test_log::test]
fn third_failure_raises_the_advisory() {
    let dir = tempfile::tempdir().unwrap();
    for pid in 1..=3 {
        record_run(dir.path(), pid, "api", &[("ruff:check", ToolStatus::Issues)]);
    }

    let insights = insights_for_dir(dir.path());

    assert_eq!(
        insights.report().unwrap().advisories,
        vec![Advisory::FrequentIssues {
            tool: "ruff:check".to_string(),
            failures: 3,
        }]
    );
}

#[test_log::test]
fn empty_log_directory_has_no_data() {
    let dir = tempfile::tempdir().unwrap();

    assert_eq!(insights_for_dir(&dir.path().join("logs")), Insights::NoData);
    assert_eq!(
        serde_json::to_value(Insights::NoData).unwrap(),
        serde_json::json!({ "status": "no_data" })
    );
}
