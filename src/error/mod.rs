//! Error handling for the connection checker

use thiserror::Error;

/// Custom error types for the connection checker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    /// The target address could not be turned into a host
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// DNS resolution errors
    #[error("DNS resolution error: {0}")]
    DnsResolution(String),

    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(String),

    /// TLS handshake errors
    #[error("TLS error: {0}")]
    Tls(String),

    /// WebSocket upgrade errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// An external service a probe depends on could not be used
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// Parsing errors (URLs, JSON, etc.)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new invalid address error
    pub fn invalid_address<S: Into<String>>(message: S) -> Self {
        Self::InvalidAddress(message.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network(message.into())
    }

    /// Create a new DNS resolution error
    pub fn dns_resolution<S: Into<String>>(message: S) -> Self {
        Self::DnsResolution(message.into())
    }

    /// Create a new HTTP request error
    pub fn http_request<S: Into<String>>(message: S) -> Self {
        Self::HttpRequest(message.into())
    }

    /// Create a new TLS error
    pub fn tls<S: Into<String>>(message: S) -> Self {
        Self::Tls(message.into())
    }

    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(message: S) -> Self {
        Self::WebSocket(message.into())
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a dependency error; the message is prefixed with the dependency name
    pub fn dependency_unavailable<D: AsRef<str>, S: AsRef<str>>(dependency: D, message: S) -> Self {
        Self::DependencyUnavailable(format!("{} unavailable: {}", dependency.as_ref(), message.as_ref()))
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Bare message without the category prefix, used as probe detail
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidAddress(msg)
            | Self::Config(msg)
            | Self::Network(msg)
            | Self::DnsResolution(msg)
            | Self::HttpRequest(msg)
            | Self::Tls(msg)
            | Self::WebSocket(msg)
            | Self::Timeout(msg)
            | Self::DependencyUnavailable(msg)
            | Self::Parse(msg)
            | Self::Io(msg)
            | Self::Internal(msg) => msg,
        }
    }

    /// Same category, different message
    pub fn with_message<S: Into<String>>(&self, message: S) -> Self {
        let message = message.into();
        match self {
            Self::InvalidAddress(_) => Self::InvalidAddress(message),
            Self::Config(_) => Self::Config(message),
            Self::Network(_) => Self::Network(message),
            Self::DnsResolution(_) => Self::DnsResolution(message),
            Self::HttpRequest(_) => Self::HttpRequest(message),
            Self::Tls(_) => Self::Tls(message),
            Self::WebSocket(_) => Self::WebSocket(message),
            Self::Timeout(_) => Self::Timeout(message),
            Self::DependencyUnavailable(_) => Self::DependencyUnavailable(message),
            Self::Parse(_) => Self::Parse(message),
            Self::Io(_) => Self::Io(message),
            Self::Internal(_) => Self::Internal(message),
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "ADDRESS",
            Self::Config(_) => "CONFIG",
            Self::Network(_) => "NETWORK",
            Self::DnsResolution(_) => "DNS",
            Self::HttpRequest(_) => "HTTP",
            Self::Tls(_) => "TLS",
            Self::WebSocket(_) => "WEBSOCKET",
            Self::Timeout(_) => "TIMEOUT",
            Self::DependencyUnavailable(_) => "DEPENDENCY",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Whether this error is a timeout rather than an outright failure
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidAddress(_) | Self::Config(_) | Self::Parse(_) => 1,
            Self::Network(_)
            | Self::DnsResolution(_)
            | Self::HttpRequest(_)
            | Self::Tls(_)
            | Self::WebSocket(_)
            | Self::DependencyUnavailable(_) => 2,
            Self::Timeout(_) => 3,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// Troubleshooting hints for the categories a user can act on
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidAddress(_) => Some(
                "Address help:\n  \
                 - Pass a host name (example.com) or a URL (https://example.com:8443/path)\n  \
                 - Only http and https schemes are supported",
            ),
            Self::Config(_) => Some(
                "Configuration help:\n  \
                 - Check your .env file format\n  \
                 - Ports must be a comma-separated list such as 80,443\n  \
                 - DNS servers must be IP addresses\n  \
                 - Run with --env-help to list the supported variables",
            ),
            Self::Network(_) => Some(
                "Network troubleshooting:\n  \
                 - Check your internet connection\n  \
                 - Try different DNS servers with --dns-servers\n  \
                 - Verify firewall settings",
            ),
            Self::Timeout(_) => Some("Timeout help:\n  - Increase the per-probe budget with --timeout"),
            _ => None,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::InvalidAddress(_) | Self::Config(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Timeout(_) => {
                    format!("[{}] {}", category.blue().bold(), message.blue())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
                _ => format!("[{}] {}", category.yellow().bold(), message.yellow()),
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::TimedOut => Self::timeout(error.to_string()),
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected
            | std::io::ErrorKind::AddrNotAvailable => Self::network(error.to_string()),
            _ => Self::io(error.to_string()),
        }
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else if error.is_connect() || error.is_request() {
            Self::network(error.to_string())
        } else {
            Self::http_request(error.to_string())
        }
    }
}

impl From<trust_dns_resolver::error::ResolveError> for AppError {
    fn from(error: trust_dns_resolver::error::ResolveError) -> Self {
        Self::dns_resolution(error.to_string())
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;
