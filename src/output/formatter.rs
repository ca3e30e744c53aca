//! Core formatting trait and the plain-text and JSON implementations

use crate::{
    error::{AppError, Result},
    models::{ProbeOutcome, Report},
    types::format_duration,
};
use std::fmt::Write as _;

/// Renders a diagnostic report for display
pub trait ReportFormatter: Send + Sync {
    /// Format the complete report
    fn format_report(&self, report: &Report) -> Result<String>;

    /// Format a single probe outcome
    fn format_outcome(&self, outcome: &ProbeOutcome) -> Result<String>;

    /// Format an error message shown instead of a report
    fn format_error(&self, error: &AppError) -> String;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show per-probe timings and the approximation marker
    pub verbose_mode: bool,
    /// Maximum output width for rules under headers
    pub max_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            max_width: 80,
        }
    }
}

/// Width of the widest probe name, used to align the detail column
pub(crate) fn name_width(report: &Report) -> usize {
    report.iter().map(|outcome| outcome.name.chars().count()).max().unwrap_or(0)
}

/// Pad `text` on the right to `width` characters
pub(crate) fn pad_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

fn write_error(e: std::fmt::Error) -> AppError {
    AppError::io(format!("Failed to format report: {}", e))
}

/// Plain text formatter for scripts and logs
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    fn format_row(&self, outcome: &ProbeOutcome, width: usize) -> String {
        let mut row = format!(
            "[{:<7}] {}  {}",
            outcome.status.label(),
            pad_right(&outcome.name, width),
            outcome.detail
        );
        if self.options.verbose_mode {
            row.push_str(&format!(" ({})", format_duration(outcome.elapsed())));
            if outcome.approximate {
                row.push_str(" [approximate]");
            }
        }
        row
    }
}

impl ReportFormatter for PlainFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let title = format!("Diagnostics for {}", report.target);
        let rule = "=".repeat(title.chars().count().min(self.options.max_width));

        writeln!(output, "{}", title).map_err(write_error)?;
        writeln!(output, "{}", rule).map_err(write_error)?;

        if report.is_empty() {
            writeln!(output, "No probes were run.").map_err(write_error)?;
        }

        let width = name_width(report);
        for outcome in report {
            writeln!(output, "{}", self.format_row(outcome, width)).map_err(write_error)?;
        }

        writeln!(output, "{}", "-".repeat(rule.len())).map_err(write_error)?;
        write!(output, "{}", report.summary()).map_err(write_error)?;

        Ok(output)
    }

    fn format_outcome(&self, outcome: &ProbeOutcome) -> Result<String> {
        Ok(self.format_row(outcome, outcome.name.chars().count()))
    }

    fn format_error(&self, error: &AppError) -> String {
        error.format_for_console(false)
    }
}

/// Machine-readable JSON output
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        report.to_json()
    }

    fn format_outcome(&self, outcome: &ProbeOutcome) -> Result<String> {
        Ok(serde_json::to_string(outcome)?)
    }

    fn format_error(&self, error: &AppError) -> String {
        serde_json::json!({
            "error": {
                "category": error.category(),
                "message": error.message(),
            }
        })
        .to_string()
    }
}
