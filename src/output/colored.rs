//! Colored formatter implementation with terminal color support
//!
//! Uses ANSI colors and status icons for interactive terminals. With colors
//! disabled it still renders the icons, only without escape sequences.

use super::formatter::{name_width, pad_right, FormattingOptions, ReportFormatter};
use crate::{
    error::{AppError, Result},
    models::{ProbeOutcome, Report},
    types::{format_duration, ProbeStatus},
};
use colored::*;
use std::fmt::Write as _;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Icon shown in front of each outcome
pub fn status_icon(status: ProbeStatus) -> &'static str {
    match status {
        ProbeStatus::Passed => "✅",
        ProbeStatus::Failed => "❌",
        ProbeStatus::TimedOut => "⏰",
        ProbeStatus::NotApplicable => "➖",
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn status_color(&self, status: ProbeStatus) -> Color {
        match status {
            ProbeStatus::Passed => self.color_scheme.success,
            ProbeStatus::Failed => self.color_scheme.error,
            ProbeStatus::TimedOut => self.color_scheme.warning,
            ProbeStatus::NotApplicable => self.color_scheme.muted,
        }
    }

    fn format_row(&self, outcome: &ProbeOutcome, width: usize) -> String {
        let name = pad_right(&outcome.name, width);
        let detail = match outcome.status {
            ProbeStatus::NotApplicable => self.dimmed(&outcome.detail).to_string(),
            status if !status.is_success() => self.colorize(&outcome.detail, self.status_color(status)).to_string(),
            _ => outcome.detail.clone(),
        };

        let mut row = format!(
            "{} {}  {}",
            status_icon(outcome.status),
            self.bold(&name),
            detail
        );
        if outcome.approximate {
            row.push_str(&format!(" {}", self.colorize("~", self.color_scheme.warning)));
        }
        if self.options.verbose_mode {
            row.push_str(&format!(
                " {}",
                self.dimmed(&format!("({})", format_duration(outcome.elapsed())))
            ));
        }
        row
    }

    fn format_summary(&self, report: &Report) -> String {
        let mut parts = vec![self
            .colorize(&format!("{} passed", report.passed_count()), self.color_scheme.success)
            .to_string()];

        let failed = report.failed_count();
        if failed > 0 {
            parts.push(
                self.colorize(&format!("{} failed", failed), self.color_scheme.error)
                    .to_string(),
            );
        }

        let not_applicable = report.not_applicable_count();
        if not_applicable > 0 {
            parts.push(self.dimmed(&format!("{} not applicable", not_applicable)).to_string());
        }

        format!("📊 {} in {}", parts.join(", "), format_duration(report.duration()))
    }
}

impl ReportFormatter for ColoredFormatter {
    fn format_report(&self, report: &Report) -> Result<String> {
        let mut output = String::new();
        let title = format!("🎯 Diagnostics for {}", report.target);
        let border = "═".repeat((title.chars().count() + 2).min(self.options.max_width));

        writeln!(output, "{}", self.colorize(&border, self.color_scheme.muted))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        let heading = if self.options.enable_color {
            title.bold().color(self.color_scheme.header)
        } else {
            title.normal()
        };
        writeln!(output, " {}", heading)
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;
        writeln!(output, "{}", self.colorize(&border, self.color_scheme.muted))
            .map_err(|e| AppError::io(format!("Failed to format header: {}", e)))?;

        if report.is_empty() {
            writeln!(output, "{}", self.dimmed("No probes were run."))
                .map_err(|e| AppError::io(format!("Failed to format report: {}", e)))?;
        }

        let width = name_width(report);
        for outcome in report {
            writeln!(output, "{}", self.format_row(outcome, width))
                .map_err(|e| AppError::io(format!("Failed to format report: {}", e)))?;
        }

        writeln!(output).map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        write!(output, "{}", self.format_summary(report))
            .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;

        if report.iter().any(|outcome| outcome.approximate) {
            write!(output, "\n{}", self.dimmed("~ approximation, not a protocol-level measurement"))
                .map_err(|e| AppError::io(format!("Failed to format summary: {}", e)))?;
        }

        Ok(output)
    }

    fn format_outcome(&self, outcome: &ProbeOutcome) -> Result<String> {
        Ok(self.format_row(outcome, outcome.name.chars().count()))
    }

    fn format_error(&self, error: &AppError) -> String {
        error.format_for_console(self.options.enable_color)
    }
}
