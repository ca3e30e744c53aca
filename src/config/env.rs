//! Environment variable handling and .env file loading

use crate::error::{AppError, Result};
use crate::models::config::parse_port_list;
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the working directory if present
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    /// Load a specific env file if it exists; existing variables win
    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Example `.env` content listing every supported variable
    pub fn create_example_env_content() -> String {
        let mut content = String::from("# Connection Checker configuration\n#\n");
        content.push_str("# Values here are defaults; environment variables and command-line\n");
        content.push_str("# arguments take precedence.\n\n");
        for (name, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, name, example));
        }
        content
    }

    /// Check one variable's value without applying it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "CHECK_TIMEOUT_SECONDS" => Self::check_range(key, value, 1, 300),
            "PORT_TIMEOUT_MS" => Self::check_range(key, value, 100, 60_000),
            "DIAGNOSTIC_DEADLINE_SECONDS" => Self::check_range(key, value, 1, 3_600),
            "MAX_CONCURRENCY" => Self::check_range(key, value, 1, 64),
            "THROUGHPUT_MAX_BYTES" => Self::check_range(key, value, 1024, 64 * 1024 * 1024),
            "CHECK_PORTS" => {
                let ports = parse_port_list(value)
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e.message())))?;
                if ports.is_empty() || ports.contains(&0) {
                    return Err(AppError::config(format!("{} must list ports between 1 and 65535", key)));
                }
                Ok(())
            }
            "DNS_SERVERS" => {
                for server in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    server
                        .parse::<std::net::IpAddr>()
                        .map_err(|e| AppError::config(format!("Invalid {} entry '{}': {}", key, server, e)))?;
                }
                Ok(())
            }
            "ISP_LOOKUP_URL" => {
                let parsed = url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if !matches!(parsed.scheme(), "http" | "https") {
                    return Err(AppError::config(format!("{} must use http or https: {}", key, value)));
                }
                Ok(())
            }
            "ENABLE_COLOR" => value
                .parse::<bool>()
                .map(|_| ())
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e))),
            // IPINFO_TOKEN is opaque; unknown keys are ignored
            _ => Ok(()),
        }
    }

    fn check_range(key: &str, value: &str, min: u64, max: u64) -> Result<()> {
        let parsed: u64 = value
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
        if parsed < min || parsed > max {
            return Err(AppError::config(format!(
                "{} must be between {} and {}, got: {}",
                key, min, max, parsed
            )));
        }
        Ok(())
    }

    /// Supported variables as `(name, description, example)`
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("CHECK_TIMEOUT_SECONDS", "Per-probe timeout in seconds (1-300)", "5"),
            ("PORT_TIMEOUT_MS", "TCP port probe timeout in milliseconds (100-60000)", "1000"),
            ("CHECK_PORTS", "Comma-separated TCP ports to probe", "80,443"),
            ("DIAGNOSTIC_DEADLINE_SECONDS", "Overall deadline for one run in seconds", "30"),
            ("MAX_CONCURRENCY", "Maximum probes running at once (1-64)", "8"),
            ("IPINFO_TOKEN", "Access token for the ISP lookup service", "your-ipinfo-token"),
            ("ISP_LOOKUP_URL", "Base URL of the ipinfo-compatible lookup service", "https://ipinfo.io"),
            ("DNS_SERVERS", "Comma-separated DNS server IPs used instead of the system resolver", "1.1.1.1,8.8.8.8"),
            ("THROUGHPUT_MAX_BYTES", "Byte cap for the throughput transfer", "1048576"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Help text describing the environment variables and precedence
    pub fn display_env_help() -> String {
        let mut help = String::from("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<28} {}\n", var, description));
            help.push_str(&format!("  {:<28} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Warnings for every currently set variable that would be rejected
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value).err().map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
