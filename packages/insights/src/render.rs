use std::fmt::{self, Display, Formatter};

use crate::{Advisory, Insights, InsightsReport, RecentRun};

impl Display for Advisory {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrequentIssues { tool, failures } => {
                write!(f, "tool {tool} frequently has issues ({failures} failing runs)")
            }
            Self::BroadExclusion { pattern, total } => write!(
                f,
                "pattern {pattern} excludes many files ({total}), verify it is intended"
            ),
            Self::NoSupportedLanguage => f.write_str("no supported language detected"),
        }
    }
}

impl Display for RecentRun {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let duration = self
            .duration_seconds
            .map_or_else(|| "running".to_string(), |x| format!("{x:.1}s"));
        let exit_code = self
            .exit_code
            .map_or_else(|| "-".to_string(), |x| x.to_string());

        write!(
            f,
            "{}  {:<24} {:>9}  exit {exit_code}",
            self.date.format("%Y-%m-%d %H:%M"),
            self.project,
            duration,
        )
    }
}

impl Display for InsightsReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run insights ({} runs)", self.run_count)?;

        if !self.languages.is_empty() {
            writeln!(f)?;
            writeln!(f, "Languages detected:")?;
            for x in &self.languages {
                writeln!(
                    f,
                    "  {:<16} {:>5} runs   avg {} files",
                    x.language, x.runs, x.average_count
                )?;
            }
        }

        if !self.tools.is_empty() {
            writeln!(f)?;
            writeln!(f, "Tool success rates:")?;
            for x in &self.tools {
                writeln!(
                    f,
                    "  {:<16} {:>5}/{:<5} {:>5.1}%",
                    x.tool,
                    x.successes,
                    x.total,
                    x.ratio * 100.0
                )?;
            }
        }

        if !self.exclusions.is_empty() {
            writeln!(f)?;
            writeln!(f, "Excluded files:")?;
            for x in &self.exclusions {
                writeln!(f, "  {:<16} {:>7} files", x.pattern, x.total)?;
            }
        }

        if !self.advisories.is_empty() {
            writeln!(f)?;
            writeln!(f, "Advisories:")?;
            for x in &self.advisories {
                writeln!(f, "  ! {x}")?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Recent runs:")?;
        for x in &self.recent {
            writeln!(f, "  {x}")?;
        }

        Ok(())
    }
}

impl Display for Insights {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => writeln!(f, "No run logs yet. Run `checkwise check` first."),
            Self::Report(report) => Display::fmt(report, f),
        }
    }
}
