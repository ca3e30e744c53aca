//! Data models and structures for the connection checker

pub mod config;
pub mod endpoint;
pub mod report;

// Re-export main model types
pub use config::Config;
pub use endpoint::{resolve_target, Endpoint};
pub use report::{ProbeOutcome, Report};
