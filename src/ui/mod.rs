pub mod theme;

use std::io::{self, Write};
use std::path::Path;

use crossterm::style::Stylize;

use crate::app::RunEvent;
use crate::models::{Suite, TestResult, TestStatus};
use crate::report::Report;

const RULE_WIDTH: usize = 60;

/// Line-oriented console output for a run.
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn banner(&mut self, base_url: &str) -> io::Result<()> {
        writeln!(self.out, "Railway Traffic Control test run against {base_url}")?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))
    }

    pub fn handle_event(&mut self, event: &RunEvent) -> io::Result<()> {
        match event {
            RunEvent::SuiteStarted { suite, cases } => {
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "{} {}",
                    suite.title().with(theme::YELLOW).bold(),
                    format!("({cases} cases)").with(theme::OVERLAY0)
                )
            }
            RunEvent::CaseFinished { result } => self.case_line(result),
            RunEvent::RunFinished { total } => {
                writeln!(self.out)?;
                writeln!(self.out, "{}", format!("{total} cases run").with(theme::OVERLAY0))?;
                self.out.flush()
            }
        }
    }

    fn case_line(&mut self, result: &TestResult) -> io::Result<()> {
        let status = result.status();
        writeln!(
            self.out,
            "  {} {} {} {}",
            status.icon().with(status.color()),
            result.test_id(),
            result.name(),
            format!("({:.2}s)", result.duration()).with(theme::MAUVE)
        )?;

        if let Some(message) = result.error_message() {
            let color = match status {
                TestStatus::Fail => theme::RED,
                _ => theme::OVERLAY0,
            };
            writeln!(self.out, "      {}", message.with(color))?;
        }
        if let Some(details) = result.details() {
            writeln!(self.out, "      {}", details.to_string().with(theme::TEAL))?;
        }
        Ok(())
    }

    pub fn summary(&mut self, report: &Report<'_>) -> io::Result<()> {
        let summary = &report.summary;

        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "{}", "TEST RESULTS SUMMARY".bold())?;
        writeln!(self.out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.out, "Total Tests: {}", summary.total_tests)?;
        writeln!(
            self.out,
            "{} Passed: {}",
            TestStatus::Pass.icon().with(TestStatus::Pass.color()),
            summary.passed
        )?;
        writeln!(
            self.out,
            "{} Failed: {}",
            TestStatus::Fail.icon().with(TestStatus::Fail.color()),
            summary.failed
        )?;
        writeln!(
            self.out,
            "{} Skipped: {}",
            TestStatus::Skip.icon().with(TestStatus::Skip.color()),
            summary.skipped
        )?;
        writeln!(self.out, "Success Rate: {:.1}%", summary.success_rate)?;
        writeln!(self.out, "Total Duration: {:.2}s", summary.total_duration)?;

        writeln!(self.out)?;
        for suite in Suite::ALL {
            let members = report.categories.get(suite);
            if members.is_empty() {
                continue;
            }
            let passed = members
                .iter()
                .filter(|r| r.status() == TestStatus::Pass)
                .count();
            writeln!(
                self.out,
                "{}: {passed}/{} passed",
                suite.title(),
                members.len()
            )?;
        }

        let mut failures = report
            .results
            .iter()
            .filter(|r| r.status() == TestStatus::Fail)
            .peekable();
        if failures.peek().is_some() {
            writeln!(self.out)?;
            writeln!(self.out, "{}", "FAILED TESTS:".with(theme::RED).bold())?;
            for result in failures {
                writeln!(self.out, "  - {}: {}", result.test_id(), result.name())?;
                writeln!(
                    self.out,
                    "    Error: {}",
                    result.error_message().unwrap_or_default()
                )?;
            }
        }

        self.out.flush()
    }

    pub fn report_saved(&mut self, path: &Path) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Full report saved to {}", path.display())
    }
}
