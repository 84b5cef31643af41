//! Console Output Helpers
//!
//! Human-facing progress and report printing. Structured logging goes
//! through `tracing`; this is the styled terminal surface.

use console::style;

use crate::pipeline::{RunReport, RunStatus, TaskStatus};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Print the per-task outcome of one orchestration run.
    pub fn run_report(&self, report: &RunReport) {
        self.section("Run report");

        for outcome in &report.outcomes {
            match outcome.status {
                TaskStatus::Succeeded => self.success(&format!(
                    "{} ({}s, {} tokens) -> {}",
                    outcome.kind,
                    outcome.duration.as_secs(),
                    outcome.usage.total(),
                    outcome.artifact.display()
                )),
                TaskStatus::Failed => self.error(&format!(
                    "{}: {}",
                    outcome.kind,
                    outcome.error.as_deref().unwrap_or("unknown error")
                )),
            }
        }

        match report.status {
            RunStatus::Complete => self.success("All tasks complete"),
            RunStatus::Partial => self.warning(&format!(
                "Partial run: {} of {} tasks failed",
                report.failed_count(),
                report.outcomes.len()
            )),
            RunStatus::Empty => self.info("No tasks were enabled"),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
