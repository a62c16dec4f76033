#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Cross-run statistics over the persisted run logs.
//!
//! [`aggregate`] folds a corpus of [`RunRecord`]s into an [`InsightsReport`]:
//! how often each language shows up, how often each tool comes back clean,
//! how many files each exclusion hides, a few advisories and the most recent
//! runs. The fold is deterministic: every ranking breaks ties by name.

use std::{collections::BTreeMap, path::Path};

use chrono::{DateTime, Utc};
use checkwise_run_log::{Outcome, RunRecord, load_corpus};
use serde::Serialize;

mod render;

/// A tool with more failures than this across the corpus gets an advisory.
pub const FREQUENT_ISSUES_THRESHOLD: u64 = 2;

/// An exclusion hiding more files than this across the corpus gets an
/// advisory.
pub const BROAD_EXCLUSION_THRESHOLD: u64 = 100;

/// Number of runs listed in [`InsightsReport::recent`].
pub const RECENT_RUNS: usize = 5;

pub const PYTHON_FAMILY: &[&str] = &["python"];
pub const WEB_FAMILY: &[&str] = &["typescript", "javascript"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageStats {
    pub language: String,
    /// Number of runs with a detection entry for this language.
    pub runs: u64,
    /// Mean detected file count over those runs, floored.
    pub average_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolStats {
    pub tool: String,
    pub successes: u64,
    pub failures: u64,
    /// Every execution, including ones whose status is neither a success
    /// nor a failure.
    pub total: u64,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusionTotal {
    pub pattern: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    FrequentIssues { tool: String, failures: u64 },
    BroadExclusion { pattern: String, total: u64 },
    NoSupportedLanguage,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRun {
    pub run_id: String,
    pub date: DateTime<Utc>,
    pub project: String,
    pub duration_seconds: Option<f64>,
    pub exit_code: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub run_count: u64,
    pub languages: Vec<LanguageStats>,
    pub tools: Vec<ToolStats>,
    pub exclusions: Vec<ExclusionTotal>,
    pub advisories: Vec<Advisory>,
    pub recent: Vec<RecentRun>,
}

impl InsightsReport {
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&ToolStats> {
        self.tools.iter().find(|x| x.tool == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "report", rename_all = "snake_case")]
pub enum Insights {
    /// The corpus is empty.
    NoData,
    Report(InsightsReport),
}

impl Insights {
    #[must_use]
    pub const fn report(&self) -> Option<&InsightsReport> {
        match self {
            Self::NoData => None,
            Self::Report(report) => Some(report),
        }
    }
}

/// Loads the corpus in `log_dir` and aggregates it. Unparseable files are
/// left out.
#[must_use]
pub fn insights_for_dir(log_dir: &Path) -> Insights {
    let corpus = load_corpus(log_dir);
    if !corpus.skipped.is_empty() {
        log::debug!(
            "Ignoring {} unreadable run log(s) in {}",
            corpus.skipped.len(),
            log_dir.display()
        );
    }
    aggregate(&corpus.records)
}

#[derive(Debug, Default)]
struct LanguageAcc {
    runs: u64,
    count_sum: u64,
}

#[derive(Debug, Default)]
struct ToolAcc {
    successes: u64,
    failures: u64,
    total: u64,
}

#[derive(Debug, Default)]
struct Accumulator {
    runs: u64,
    languages: BTreeMap<String, LanguageAcc>,
    tools: BTreeMap<String, ToolAcc>,
    exclusions: BTreeMap<String, u64>,
}

impl Accumulator {
    fn add(mut self, record: &RunRecord) -> Self {
        self.runs += 1;

        for (language, entry) in &record.detections {
            let acc = self.languages.entry(language.clone()).or_default();
            acc.runs += 1;
            acc.count_sum = acc.count_sum.saturating_add(entry.count);
        }

        for execution in &record.tool_executions {
            let acc = self.tools.entry(execution.tool.clone()).or_default();
            acc.total += 1;
            match execution.status.outcome() {
                Outcome::Success => acc.successes += 1,
                Outcome::Failure => acc.failures += 1,
                Outcome::Unclassified => {}
            }
        }

        for (pattern, count) in &record.exclusions {
            let total = self.exclusions.entry(pattern.clone()).or_default();
            *total = total.saturating_add(*count);
        }

        self
    }
}

/// Aggregates `records` into an [`InsightsReport`].
///
/// Returns [`Insights::NoData`] for an empty corpus.
#[must_use]
pub fn aggregate(records: &[RunRecord]) -> Insights {
    if records.is_empty() {
        return Insights::NoData;
    }

    let acc = records.iter().fold(Accumulator::default(), Accumulator::add);

    let mut languages = acc
        .languages
        .into_iter()
        .map(|(language, x)| LanguageStats {
            language,
            runs: x.runs,
            average_count: x.count_sum / x.runs,
        })
        .collect::<Vec<_>>();
    languages.sort_by(|a, b| b.runs.cmp(&a.runs).then_with(|| a.language.cmp(&b.language)));

    #[allow(clippy::cast_precision_loss)]
    let mut tools = acc
        .tools
        .into_iter()
        .map(|(tool, x)| ToolStats {
            tool,
            successes: x.successes,
            failures: x.failures,
            total: x.total,
            ratio: x.successes as f64 / x.total as f64,
        })
        .collect::<Vec<_>>();
    tools.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.tool.cmp(&b.tool)));

    let mut exclusions = acc
        .exclusions
        .into_iter()
        .map(|(pattern, total)| ExclusionTotal { pattern, total })
        .collect::<Vec<_>>();
    exclusions.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.pattern.cmp(&b.pattern)));

    let advisories = advisories(records, &tools, &exclusions);

    let mut recent = records.iter().collect::<Vec<_>>();
    recent.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.run_id.cmp(&a.run_id))
    });
    let recent = recent
        .into_iter()
        .take(RECENT_RUNS)
        .map(|record| RecentRun {
            run_id: record.run_id.clone(),
            date: record.timestamp,
            project: record.project.clone(),
            duration_seconds: record.duration_seconds,
            exit_code: record.exit_code,
        })
        .collect();

    Insights::Report(InsightsReport {
        run_count: acc.runs,
        languages,
        tools,
        exclusions,
        advisories,
        recent,
    })
}

fn advisories(
    records: &[RunRecord],
    tools: &[ToolStats],
    exclusions: &[ExclusionTotal],
) -> Vec<Advisory> {
    let mut advisories = tools
        .iter()
        .filter(|x| x.failures > FREQUENT_ISSUES_THRESHOLD)
        .map(|x| Advisory::FrequentIssues {
            tool: x.tool.clone(),
            failures: x.failures,
        })
        .collect::<Vec<_>>();

    advisories.extend(
        exclusions
            .iter()
            .filter(|x| x.total > BROAD_EXCLUSION_THRESHOLD)
            .map(|x| Advisory::BroadExclusion {
                pattern: x.pattern.clone(),
                total: x.total,
            }),
    );

    let supported_language_seen = records.iter().any(|record| {
        PYTHON_FAMILY
            .iter()
            .chain(WEB_FAMILY)
            .any(|language| record.detections.contains_key(*language))
    });
    if !supported_language_seen {
        advisories.push(Advisory::NoSupportedLanguage);
    }

    advisories
}
