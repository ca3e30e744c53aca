//! Connection Checker
//!
//! A network-reachability diagnostic engine. Given a target address it runs a
//! fixed battery of independent connectivity probes (DNS, HTTP, TLS/SNI,
//! WebSocket, tunnel feasibility, ISP lookup, TCP ports, throughput) and
//! returns an ordered report with one outcome per probe.

pub mod app;
pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod executor;
pub mod isp;
pub mod logging;
pub mod models;
pub mod output;
pub mod probes;
pub mod types;

// Re-export commonly used types
pub use app::ConnectionChecker;
pub use error::{AppError, Result};
pub use executor::DiagnosticOrchestrator;
pub use models::{resolve_target, Config, Endpoint, ProbeOutcome, Report};
pub use output::{ColoredFormatter, JsonFormatter, OutputFormatterFactory, PlainFormatter, ReportFormatter};
pub use probes::{CatalogEntry, Probe, ProbeCatalog, ProbeContext};
pub use types::{ProbeStatus, Scheme};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_DIAGNOSTIC_DEADLINE: Duration = Duration::from_secs(30);
    pub const MAX_DIAGNOSTIC_DEADLINE: Duration = Duration::from_secs(3600);
    pub const DEFAULT_PORTS: &[u16] = &[80, 443];
    pub const DEFAULT_ISP_LOOKUP_URL: &str = "https://ipinfo.io";
    pub const DEFAULT_THROUGHPUT_MAX_BYTES: u64 = 1024 * 1024;
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    /// Port dialled by the tunnel feasibility heuristic
    pub const TUNNEL_PROBE_PORT: u16 = 443;

    /// Slack added on top of a probe's own budget before the orchestrator
    /// abandons it
    pub const TIMEOUT_GRACE: Duration = Duration::from_millis(250);
}
