//! Diagnostic target model and the address resolver that produces it

use crate::{
    error::{AppError, Result},
    types::Scheme,
};
use serde::{Deserialize, Serialize};
use std::{fmt, net::IpAddr};
use url::{Host, Url};

/// Normalized target of one diagnostic run
///
/// Built once per request by [`resolve_target`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    scheme: Scheme,
    port: Option<u16>,
}

impl Endpoint {
    /// Build an endpoint from already-validated parts
    pub fn new<S: Into<String>>(host: S, scheme: Scheme, port: Option<u16>) -> Result<Self> {
        let host = host.into();
        if host.trim().is_empty() {
            return Err(AppError::invalid_address("host cannot be empty"));
        }
        Ok(Self { host, scheme, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Port named in the input address, if any
    pub fn explicit_port(&self) -> Option<u16> {
        self.port
    }

    /// Effective port: explicit port or the scheme default
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    /// Host parsed as an IP address when the target is an address literal
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }

    /// `host[:port]`, bracketing IPv6 literals
    pub fn authority(&self) -> String {
        let host = match self.ip_literal() {
            Some(IpAddr::V6(_)) => format!("[{}]", self.host),
            _ => self.host.clone(),
        };
        match self.port {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        }
    }

    /// Base URL of the target, e.g. `https://example.com`
    pub fn url(&self) -> String {
        format!("{}://{}", self.scheme, self.authority())
    }

    /// Target URL under another scheme (used for `ws://` / `wss://`)
    pub fn url_with_scheme(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, self.authority())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Parse a user-supplied address into an [`Endpoint`]
///
/// Accepts `example.com`, `example.com:8443`, `http://example.com/path` and
/// similar. When no scheme is present `https://` is assumed. Performs no I/O.
pub fn resolve_target(raw: &str) -> Result<Endpoint> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_address("address is empty"));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{}://{}", Scheme::default(), trimmed)
    };

    let parsed = Url::parse(&candidate)
        .map_err(|e| AppError::invalid_address(format!("'{}' is not a valid address: {}", trimmed, e)))?;

    let scheme = Scheme::from_name(parsed.scheme()).ok_or_else(|| {
        AppError::invalid_address(format!(
            "unsupported scheme '{}' in '{}' (expected http or https)",
            parsed.scheme(),
            trimmed
        ))
    })?;

    let mut host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => String::new(),
    };

    // No network location: fall back to the first path segment
    if host.is_empty() {
        host = parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default()
            .to_string();
    }

    if host.is_empty() {
        return Err(AppError::invalid_address(format!("no host found in '{}'", trimmed)));
    }

    Endpoint::new(host, scheme, parsed.port())
}
