//! Configuration data model and validation

use crate::defaults::MAX_DIAGNOSTIC_DEADLINE;
use crate::types::{AppError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Time budget for each probe other than the port probes
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_seconds: u64,

    /// Time budget for each TCP port probe
    #[serde(default = "default_port_timeout_ms")]
    pub port_timeout_ms: u64,

    /// Overall deadline for one diagnostic run
    #[serde(default = "default_deadline_secs")]
    pub deadline_seconds: u64,

    /// TCP ports probed, one outcome each
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,

    /// Maximum number of probes running at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Access token for the ISP lookup service
    #[serde(default, skip_serializing)]
    pub ipinfo_token: Option<String>,

    /// Base URL of the ipinfo-compatible lookup service
    #[serde(default = "default_isp_lookup_url")]
    pub isp_lookup_url: String,

    /// DNS servers used instead of the system resolver configuration
    #[serde(default)]
    pub dns_servers: Vec<String>,

    /// Byte cap for the throughput transfer
    #[serde(default = "default_throughput_max_bytes")]
    pub throughput_max_bytes: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_timeout_seconds: default_probe_timeout_secs(),
            port_timeout_ms: default_port_timeout_ms(),
            deadline_seconds: default_deadline_secs(),
            ports: default_ports(),
            max_concurrency: default_max_concurrency(),
            ipinfo_token: None,
            isp_lookup_url: default_isp_lookup_url(),
            dns_servers: Vec::new(),
            throughput_max_bytes: default_throughput_max_bytes(),
            enable_color: default_enable_color(),
            output_format: default_output_format(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_seconds)
    }

    pub fn port_timeout(&self) -> Duration {
        Duration::from_millis(self.port_timeout_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }

    /// Parsed DNS server addresses
    pub fn dns_server_addrs(&self) -> Result<Vec<IpAddr>> {
        self.dns_servers
            .iter()
            .map(|server| {
                IpAddr::from_str(server)
                    .map_err(|e| AppError::config(format!("Invalid DNS server IP address '{}': {}", server, e)))
            })
            .collect()
    }

    /// Validate the configuration and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.probe_timeout_seconds == 0 || self.probe_timeout_seconds > 300 {
            return Err(AppError::config(format!(
                "Probe timeout must be between 1 and 300 seconds, got {}",
                self.probe_timeout_seconds
            )));
        }

        if self.port_timeout_ms < 100 || self.port_timeout_ms > 60_000 {
            return Err(AppError::config(format!(
                "Port timeout must be between 100 and 60000 ms, got {}",
                self.port_timeout_ms
            )));
        }

        if self.deadline_seconds > MAX_DIAGNOSTIC_DEADLINE.as_secs() {
            return Err(AppError::config(format!(
                "Diagnostic deadline must be at most {} seconds, got {}",
                MAX_DIAGNOSTIC_DEADLINE.as_secs(),
                self.deadline_seconds
            )));
        }

        if self.deadline_seconds < self.probe_timeout_seconds {
            return Err(AppError::config(format!(
                "Diagnostic deadline ({}s) cannot be shorter than the probe timeout ({}s)",
                self.deadline_seconds, self.probe_timeout_seconds
            )));
        }

        if self.max_concurrency == 0 || self.max_concurrency > 64 {
            return Err(AppError::config(format!(
                "Concurrency must be between 1 and 64, got {}",
                self.max_concurrency
            )));
        }

        if self.ports.is_empty() {
            return Err(AppError::config("At least one port must be probed"));
        }

        let mut seen = HashSet::new();
        for &port in &self.ports {
            if port == 0 {
                return Err(AppError::config("Port 0 cannot be probed"));
            }
            if !seen.insert(port) {
                return Err(AppError::config(format!("Port {} is listed more than once", port)));
            }
        }

        match url::Url::parse(&self.isp_lookup_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(_) => {
                return Err(AppError::config(format!(
                    "ISP lookup URL must use http or https: {}",
                    self.isp_lookup_url
                )))
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid ISP lookup URL '{}': {}",
                    self.isp_lookup_url, e
                )))
            }
        }

        self.dns_server_addrs()?;

        if self.throughput_max_bytes < 1024 || self.throughput_max_bytes > 64 * 1024 * 1024 {
            return Err(AppError::config(format!(
                "Throughput transfer cap must be between 1 KiB and 64 MiB, got {} bytes",
                self.throughput_max_bytes
            )));
        }

        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(timeout) = std::env::var("CHECK_TIMEOUT_SECONDS") {
            self.probe_timeout_seconds = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid CHECK_TIMEOUT_SECONDS value '{}': {}", timeout, e)))?;
        }

        if let Ok(timeout) = std::env::var("PORT_TIMEOUT_MS") {
            self.port_timeout_ms = timeout.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid PORT_TIMEOUT_MS value '{}': {}", timeout, e)))?;
        }

        if let Ok(ports) = std::env::var("CHECK_PORTS") {
            self.ports = parse_port_list(&ports)
                .map_err(|e| AppError::config(format!("Invalid CHECK_PORTS value '{}': {}", ports, e.message())))?;
        }

        if let Ok(deadline) = std::env::var("DIAGNOSTIC_DEADLINE_SECONDS") {
            self.deadline_seconds = deadline.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid DIAGNOSTIC_DEADLINE_SECONDS value '{}': {}", deadline, e)))?;
        }

        if let Ok(concurrency) = std::env::var("MAX_CONCURRENCY") {
            self.max_concurrency = concurrency.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid MAX_CONCURRENCY value '{}': {}", concurrency, e)))?;
        }

        if let Ok(token) = std::env::var("IPINFO_TOKEN") {
            let token = token.trim();
            self.ipinfo_token = if token.is_empty() { None } else { Some(token.to_string()) };
        }

        if let Ok(lookup_url) = std::env::var("ISP_LOOKUP_URL") {
            self.isp_lookup_url = lookup_url.trim().to_string();
        }

        if let Ok(dns_servers) = std::env::var("DNS_SERVERS") {
            self.dns_servers = split_list(&dns_servers);
        }

        if let Ok(max_bytes) = std::env::var("THROUGHPUT_MAX_BYTES") {
            self.throughput_max_bytes = max_bytes.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid THROUGHPUT_MAX_BYTES value '{}': {}", max_bytes, e)))?;
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

/// Split a comma-separated list, dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a comma-separated port list such as `80,443`
pub fn parse_port_list(value: &str) -> Result<Vec<u16>> {
    split_list(value)
        .iter()
        .map(|port| {
            port.parse::<u16>()
                .map_err(|e| AppError::parse(format!("'{}' is not a valid port: {}", port, e)))
        })
        .collect()
}

// Default value functions for serde
fn default_probe_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_PROBE_TIMEOUT.as_secs()
}

fn default_port_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_PORT_TIMEOUT.as_millis() as u64
}

fn default_deadline_secs() -> u64 {
    crate::defaults::DEFAULT_DIAGNOSTIC_DEADLINE.as_secs()
}

fn default_ports() -> Vec<u16> {
    crate::defaults::DEFAULT_PORTS.to_vec()
}

fn default_max_concurrency() -> usize {
    (num_cpus::get() * 2).clamp(4, 16)
}

fn default_isp_lookup_url() -> String {
    crate::defaults::DEFAULT_ISP_LOOKUP_URL.to_string()
}

fn default_throughput_max_bytes() -> u64 {
    crate::defaults::DEFAULT_THROUGHPUT_MAX_BYTES
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Text
}
