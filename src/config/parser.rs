//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::config::{parse_port_list, split_list, Config},
};

/// Builds the final configuration: defaults, `.env`, environment, then CLI
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and validate the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file(self.cli.debug)?;
        if self.cli.debug {
            for warning in EnvManager::validate_current_env() {
                eprintln!("{}", warning);
            }
        }

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply the options present on the command line
    pub fn apply_cli_overrides(&self, config: &mut Config) -> Result<()> {
        let cli = &self.cli;

        if let Some(timeout) = cli.timeout {
            config.probe_timeout_seconds = timeout;
            // A shorter run deadline than the probe timeout would be rejected
            if config.deadline_seconds < timeout && cli.deadline.is_none() {
                config.deadline_seconds = timeout;
            }
        }

        if let Some(port_timeout_ms) = cli.port_timeout_ms {
            config.port_timeout_ms = port_timeout_ms;
        }

        if let Some(ports) = &cli.ports {
            config.ports = parse_port_list(ports)
                .map_err(|e| AppError::config(format!("Invalid --ports value '{}': {}", ports, e.message())))?;
        }

        if let Some(deadline) = cli.deadline {
            config.deadline_seconds = deadline;
        }

        if let Some(concurrency) = cli.concurrency {
            config.max_concurrency = concurrency;
        }

        if let Some(token) = &cli.ipinfo_token {
            let token = token.trim();
            config.ipinfo_token = if token.is_empty() { None } else { Some(token.to_string()) };
        }

        if let Some(lookup_url) = &cli.isp_lookup_url {
            config.isp_lookup_url = lookup_url.trim().to_string();
        }

        if let Some(dns_servers) = &cli.dns_servers {
            config.dns_servers = split_list(dns_servers);
        }

        if let Some(format) = cli.format {
            config.output_format = format;
        }

        if let Some(enable_color) = cli.color_override() {
            config.enable_color = enable_color;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        Ok(())
    }
}

/// Load the complete configuration for `cli`
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Multi-line configuration summary; the ISP token is never shown
pub fn display_config_summary(config: &Config) -> String {
    let ports: Vec<String> = config.ports.iter().map(u16::to_string).collect();
    let dns = if config.dns_servers.is_empty() {
        "system resolver".to_string()
    } else {
        config.dns_servers.join(", ")
    };

    let summary = [
        format!("Probe timeout: {}s", config.probe_timeout_seconds),
        format!("Port timeout: {}ms", config.port_timeout_ms),
        format!("Ports: {}", ports.join(", ")),
        format!("Deadline: {}s", config.deadline_seconds),
        format!("Max concurrency: {}", config.max_concurrency),
        format!("DNS: {}", dns),
        format!("ISP lookup: {}", config.isp_lookup_url),
        format!(
            "ISP token: {}",
            if config.ipinfo_token.is_some() { "configured" } else { "not set" }
        ),
        format!("Throughput cap: {} bytes", config.throughput_max_bytes),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutputFormat;
    use clap::Parser;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const MANAGED_VARS: &[&str] = &[
        "CHECK_TIMEOUT_SECONDS",
        "PORT_TIMEOUT_MS",
        "CHECK_PORTS",
        "DIAGNOSTIC_DEADLINE_SECONDS",
        "MAX_CONCURRENCY",
        "IPINFO_TOKEN",
        "ISP_LOOKUP_URL",
        "DNS_SERVERS",
        "THROUGHPUT_MAX_BYTES",
        "ENABLE_COLOR",
    ];

    fn clear_env() {
        for var in MANAGED_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_cli_overrides() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let cli = Cli::parse_from([
            "ccheck", "--timeout", "3", "--ports", "22,8080", "--no-color", "--verbose", "--format", "json",
            "example.com",
        ]);
        let config = ConfigParser::new(cli).parse().unwrap();

        assert_eq!(config.probe_timeout_seconds, 3);
        assert_eq!(config.ports, vec![22, 8080]);
        assert!(!config.enable_color);
        assert!(config.verbose);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_env_values_apply() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("CHECK_PORTS", "443,8443");
        env::set_var("IPINFO_TOKEN", "from-env");
        env::set_var("PORT_TIMEOUT_MS", "750");

        let cli = Cli::parse_from(["ccheck", "example.com"]);
        let config = ConfigParser::new(cli).parse();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.ports, vec![443, 8443]);
        assert_eq!(config.ipinfo_token.as_deref(), Some("from-env"));
        assert_eq!(config.port_timeout_ms, 750);
    }

    #[test]
    fn test_cli_overrides_env_vars() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("CHECK_TIMEOUT_SECONDS", "8");

        let cli = Cli::parse_from(["ccheck", "--timeout", "12", "example.com"]);
        let config = ConfigParser::new(cli).parse();
        clear_env();

        assert_eq!(config.unwrap().probe_timeout_seconds, 12);
    }

    #[test]
    fn test_invalid_env_value_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("MAX_CONCURRENCY", "lots");

        let cli = Cli::parse_from(["ccheck", "example.com"]);
        let result = ConfigParser::new(cli).parse();
        clear_env();

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_long_timeout_raises_deadline() {
        let mut config = Config::default();
        let cli = Cli::parse_from(["ccheck", "--timeout", "60", "example.com"]);
        ConfigParser::new(cli).apply_cli_overrides(&mut config).unwrap();
        assert_eq!(config.deadline_seconds, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_ports_rejected() {
        let mut config = Config::default();
        let cli = Cli::parse_from(["ccheck", "--ports", "80,http", "example.com"]);
        let error = ConfigParser::new(cli).apply_cli_overrides(&mut config).unwrap_err();
        assert!(error.message().contains("--ports"));
    }

    #[test]
    fn test_config_summary_masks_token() {
        let config = Config {
            ipinfo_token: Some("super-secret".to_string()),
            ..Default::default()
        };
        let summary = display_config_summary(&config);
        assert!(summary.contains("ISP token: configured"));
        assert!(!summary.contains("super-secret"));
        assert!(summary.contains("Ports: 80, 443"));
        assert!(summary.contains("DNS: system resolver"));
    }
}
