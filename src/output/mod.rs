//! Output formatting and display system
//!
//! Renders a [`Report`](crate::models::Report) as colored console text, plain
//! text for scripts, or JSON.

mod colored;
mod formatter;

pub use colored::{status_icon, ColorScheme, ColoredFormatter};
pub use formatter::{FormattingOptions, JsonFormatter, PlainFormatter, ReportFormatter};

use crate::{models::Config, types::OutputFormat};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a text formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn ReportFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Formatter selected by the configured output format
    pub fn create(config: &Config) -> Box<dyn ReportFormatter> {
        match config.output_format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Text => Self::create_formatter(config.enable_color, config.verbose || config.debug),
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter() -> Box<dyn ReportFormatter> {
        Self::create_formatter(false, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProbeOutcome, Report};
    use chrono::Utc;
    use std::time::Duration;

    fn report() -> Report {
        Report::new(
            "https://example.com".to_string(),
            vec![ProbeOutcome::passed("HTTP Connection", "Response code: 200")],
            Utc::now(),
            Duration::from_millis(80),
        )
    }

    #[test]
    fn test_factory_picks_json() {
        let config = Config {
            output_format: OutputFormat::Json,
            ..Default::default()
        };
        let output = OutputFormatterFactory::create(&config).format_report(&report()).unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&output).is_ok());
    }

    #[test]
    fn test_factory_picks_plain_without_color() {
        let config = Config {
            enable_color: false,
            ..Default::default()
        };
        let output = OutputFormatterFactory::create(&config).format_report(&report()).unwrap();
        assert!(output.contains("[PASS   ] HTTP Connection"));
    }

    #[test]
    fn test_factory_picks_colored() {
        let output = OutputFormatterFactory::create_formatter(true, false)
            .format_report(&report())
            .unwrap();
        assert!(output.contains("✅"));
    }

    #[test]
    fn test_plain_formatter_helper() {
        let output = OutputFormatterFactory::create_plain_formatter()
            .format_report(&report())
            .unwrap();
        assert!(output.ends_with("1 passed, 0 failed, 0 not applicable in 80ms"));
    }
}
