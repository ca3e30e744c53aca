//! Type definitions and aliases

use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// URL scheme of a diagnostic target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// Parse a scheme name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    /// Port used when the address does not name one
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Http => 80,
            Self::Https => 443,
        }
    }

    /// Matching WebSocket scheme
    pub fn websocket_scheme(&self) -> &'static str {
        match self {
            Self::Http => "ws",
            Self::Https => "wss",
        }
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::Https
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// The check passed
    Passed,
    /// The check ran and did not pass
    Failed,
    /// The check exceeded its time budget
    TimedOut,
    /// The check does not apply to this endpoint (e.g. SNI over plain HTTP)
    NotApplicable,
}

impl ProbeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Short label for plain-text output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Failed => "FAIL",
            Self::TimedOut => "TIMEOUT",
            Self::NotApplicable => "N/A",
        }
    }
}

/// Output format for the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(AppError::parse(format!("Invalid output format: {} (expected text or json)", s))),
        }
    }
}

/// Render a duration compactly: `750ms`, `1s`, `2.5s`
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!(Scheme::from_name("HTTP"), Some(Scheme::Http));
        assert_eq!(Scheme::from_name("https"), Some(Scheme::Https));
        assert_eq!(Scheme::from_name("ftp"), None);
        assert_eq!(Scheme::default(), Scheme::Https);
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(Scheme::Http.default_port(), 80);
        assert_eq!(Scheme::Https.default_port(), 443);
    }

    #[test]
    fn test_websocket_schemes() {
        assert_eq!(Scheme::Http.websocket_scheme(), "ws");
        assert_eq!(Scheme::Https.websocket_scheme(), "wss");
    }

    #[test]
    fn test_probe_status_success() {
        assert!(ProbeStatus::Passed.is_success());
        assert!(!ProbeStatus::Failed.is_success());
        assert!(!ProbeStatus::TimedOut.is_success());
        assert!(!ProbeStatus::NotApplicable.is_success());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(750)), "750ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5s");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
    }
}
