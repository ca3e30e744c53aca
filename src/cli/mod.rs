//! Command-line interface

use crate::{
    defaults::MAX_DIAGNOSTIC_DEADLINE,
    error::AppError,
    types::OutputFormat,
};
use clap::Parser;

/// Connection Checker - one-shot reachability diagnostics for a single target
#[derive(Parser, Debug, Clone)]
#[command(name = "ccheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Host name or URL to diagnose; https is assumed when no scheme is given
    #[arg(value_name = "TARGET", required_unless_present = "env_help")]
    pub target: Option<String>,

    /// Per-probe timeout in seconds
    #[arg(short, long, value_parser = parse_seconds)]
    pub timeout: Option<u64>,

    /// TCP port probe timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub port_timeout_ms: Option<u64>,

    /// TCP ports to probe (comma-separated)
    #[arg(short, long, value_name = "LIST")]
    pub ports: Option<String>,

    /// Overall deadline for the whole run in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_deadline)]
    pub deadline: Option<u64>,

    /// Maximum number of probes running at once
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Access token for the ISP lookup service
    #[arg(long, env = "IPINFO_TOKEN", hide_env_values = true)]
    pub ipinfo_token: Option<String>,

    /// Base URL of the ipinfo-compatible lookup service
    #[arg(long, value_name = "URL")]
    pub isp_lookup_url: Option<String>,

    /// DNS servers to use instead of the system resolver (comma-separated)
    #[arg(long, value_name = "LIST")]
    pub dns_servers: Option<String>,

    /// Output format: text or json
    #[arg(short, long, value_parser = parse_format)]
    pub format: Option<OutputFormat>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Describe the supported environment variables and exit
    #[arg(long)]
    pub env_help: bool,
}

impl Cli {
    /// The target to diagnose; only `--env-help` runs without one
    pub fn require_target(&self) -> crate::error::Result<&str> {
        self.target
            .as_deref()
            .ok_or_else(|| AppError::config("no target given"))
    }

    /// Color preference implied by the flags; `None` leaves it to configuration
    pub fn color_override(&self) -> Option<bool> {
        if self.no_color {
            Some(false)
        } else if self.color {
            Some(true)
        } else if !supports_color() {
            Some(false)
        } else {
            None
        }
    }

    /// Short description of the arguments given, for debug output
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::from("Command line:\n");
        summary.push_str(&format!("  Target: {}\n", self.target.as_deref().unwrap_or("(none)")));
        if let Some(timeout) = self.timeout {
            summary.push_str(&format!("  Timeout: {}s\n", timeout));
        }
        if let Some(ports) = &self.ports {
            summary.push_str(&format!("  Ports: {}\n", ports));
        }
        if let Some(dns_servers) = &self.dns_servers {
            summary.push_str(&format!("  DNS servers: {}\n", dns_servers));
        }
        summary.push_str(&format!("  Verbose: {}\n", self.verbose));
        summary.push_str(&format!("  Debug: {}\n", self.debug));
        summary
    }
}

/// Parse a per-probe timeout in whole seconds
fn parse_seconds(s: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid duration: {}", s));
    }

    s.parse::<u64>()
        .map_err(|_| format!("Invalid duration: {}", s))
        .and_then(|secs| {
            if secs == 0 {
                Err("Duration must be greater than 0".to_string())
            } else if secs > 300 {
                Err("Duration cannot exceed 300 seconds".to_string())
            } else {
                Ok(secs)
            }
        })
}

fn parse_deadline(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(secs) if (1..=MAX_DIAGNOSTIC_DEADLINE.as_secs()).contains(&secs) => Ok(secs),
        Ok(_) => Err(format!(
            "Deadline must be between 1 and {} seconds",
            MAX_DIAGNOSTIC_DEADLINE.as_secs()
        )),
        Err(_) => Err(format!("Invalid deadline: {}", s)),
    }
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.message().to_string())
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_target_is_config_error() {
        let cli = Cli::parse_from(["ccheck", "--env-help"]);
        let error = cli.require_target().unwrap_err();
        assert!(matches!(error, AppError::Config(_)));
        assert_eq!(error.exit_code(), 1);

        let cli = Cli::parse_from(["ccheck", "example.com"]);
        assert_eq!(cli.require_target().unwrap(), "example.com");
    }

    #[test]
    fn test_target_is_positional() {
        let cli = Cli::parse_from(["ccheck", "example.com"]);
        assert_eq!(cli.target.as_deref(), Some("example.com"));
        assert!(cli.timeout.is_none());
        assert!(cli.ports.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_target_required() {
        assert!(Cli::try_parse_from(["ccheck"]).is_err());
        assert!(Cli::try_parse_from(["ccheck", "--env-help"]).is_ok());
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::parse_from([
            "ccheck",
            "--timeout", "3",
            "--port-timeout-ms", "500",
            "--ports", "22,80",
            "--deadline", "20",
            "-j", "4",
            "--ipinfo-token", "abc",
            "--isp-lookup-url", "http://127.0.0.1:9",
            "--dns-servers", "1.1.1.1",
            "--format", "json",
            "--no-color",
            "--debug",
            "https://example.com",
        ]);
        assert_eq!(cli.timeout, Some(3));
        assert_eq!(cli.port_timeout_ms, Some(500));
        assert_eq!(cli.ports.as_deref(), Some("22,80"));
        assert_eq!(cli.deadline, Some(20));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.ipinfo_token.as_deref(), Some("abc"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.color_override(), Some(false));
        assert!(cli.debug);
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_seconds("5"), Ok(5));
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("301").is_err());
        assert!(parse_seconds("+5").is_err());
        assert!(parse_seconds("0x10").is_err());
        assert!(parse_seconds("five").is_err());
        assert!(parse_deadline("0").is_err());
        assert_eq!(parse_deadline("600"), Ok(600));
        assert!(parse_deadline("3601").is_err());
        assert!(parse_deadline("18446744073709551615").is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(Cli::try_parse_from(["ccheck", "--format", "yaml", "example.com"]).is_err());
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["ccheck", "--color", "--no-color", "example.com"]).is_err());
    }

    #[test]
    fn test_config_summary() {
        let cli = Cli::parse_from(["ccheck", "--ports", "443", "example.com"]);
        let summary = cli.get_config_summary();
        assert!(summary.contains("Target: example.com"));
        assert!(summary.contains("Ports: 443"));
    }
}
