//! Structured logging for diagnostic runs
//!
//! Entries carry a logger name, an optional correlation id (one per run) and
//! free-form JSON fields. Every entry goes to stderr so the rendered report on
//! stdout stays machine-readable.

use crate::error::{AppError, Result};
use crate::models::{Config, ProbeOutcome, Report};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    fn colorize(&self, text: &str) -> String {
        match self {
            LogLevel::Trace => text.white().to_string(),
            LogLevel::Debug => text.cyan().to_string(),
            LogLevel::Info => text.green().to_string(),
            LogLevel::Warn => text.yellow().to_string(),
            LogLevel::Error => text.red().to_string(),
            LogLevel::Fatal => text.magenta().bold().to_string(),
        }
    }

    /// Level implied by the verbosity flags of a configuration
    pub fn from_config(config: &Config) -> Self {
        if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation id tying together the entries of one run
    pub correlation_id: Option<String>,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
}

/// Logger with leveled, formatted output to stderr
#[derive(Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
}

impl Logger {
    pub fn new(name: &str) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name: name.to_string(),
        }
    }

    /// Logger whose level and format follow the verbosity flags
    pub fn with_config(name: &str, config: &Config) -> Self {
        Self {
            min_level: LogLevel::from_config(config),
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name: name.to_string(),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        let output = self.render(&entry);
        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level = format!("{:>5}", entry.level.as_str());
        let level = if self.use_color { entry.level.colorize(&level) } else { level };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        serde_json::to_string(entry).unwrap_or_else(|_| {
            serde_json::json!({ "error": "Failed to serialize log entry", "message": entry.message }).to_string()
        })
    }
}

/// Builder for a single log entry
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    /// Attach the fields of a probe outcome
    pub fn outcome(self, outcome: &ProbeOutcome) -> Self {
        self.field("probe", &outcome.name)
            .field("status", outcome.status)
            .field("elapsed_ms", outcome.elapsed_ms)
            .field("approximate", outcome.approximate)
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for the lifecycle of diagnostic runs
#[derive(Clone)]
pub struct DiagnosticLogger {
    logger: Logger,
}

impl DiagnosticLogger {
    pub fn new(config: &Config) -> Self {
        Self {
            logger: Logger::with_config("DIAG", config),
        }
    }

    /// Logger that drops everything below errors
    pub fn quiet() -> Self {
        let mut logger = Logger::new("DIAG");
        logger.set_level(LogLevel::Error);
        Self { logger }
    }

    /// Log the start of a run and return its correlation id
    pub async fn log_run_started(&self, target: &str, probe_count: usize) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.logger
            .info(&format!("Starting diagnostics for {} ({} probes)", target, probe_count))
            .correlation_id(&correlation_id)
            .field("target", target)
            .field("probe_count", probe_count)
            .log()
            .await;
        correlation_id
    }

    pub async fn log_probe_outcome(&self, correlation_id: &str, outcome: &ProbeOutcome) {
        let level = if outcome.success { LogLevel::Debug } else { LogLevel::Info };
        self.logger
            .log(level, &format!("{}: {}", outcome.name, outcome.detail))
            .correlation_id(correlation_id)
            .outcome(outcome)
            .log()
            .await;
    }

    /// Log a probe that the orchestrator had to abandon or recover from
    pub async fn log_probe_fault(&self, correlation_id: &str, probe: &str, fault: &str) {
        self.logger
            .warn(&format!("Probe {} did not complete normally: {}", probe, fault))
            .correlation_id(correlation_id)
            .field("probe", probe)
            .field("fault", fault)
            .log()
            .await;
    }

    pub async fn log_run_completed(&self, correlation_id: &str, report: &Report) {
        self.logger
            .info(&format!("Diagnostics for {} finished: {}", report.target, report.summary()))
            .correlation_id(correlation_id)
            .field("passed", report.passed_count())
            .field("failed", report.failed_count())
            .field("not_applicable", report.not_applicable_count())
            .field("duration_ms", report.duration_ms)
            .log()
            .await;
    }

    pub async fn log_error(&self, error: &AppError, context: &str) {
        self.logger
            .error(&format!("{}: {}", context, error))
            .error_info(error)
            .field("context", context)
            .log()
            .await;
    }
}
