//! DNS resolution shared by the probes that need target addresses

use crate::{
    error::{AppError, Result},
    models::Config,
};
use std::{
    net::{IpAddr, SocketAddr},
    time::Duration,
};
use trust_dns_resolver::{
    config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts},
    system_conf,
    TokioAsyncResolver,
};

/// Where the resolver configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverSource {
    /// Host resolver configuration (`/etc/resolv.conf` or platform equivalent)
    System,
    /// Explicit DNS servers from configuration
    Custom(Vec<IpAddr>),
    /// Built-in public resolvers, used when system configuration is unreadable
    Fallback,
}

impl ResolverSource {
    pub fn name(&self) -> String {
        match self {
            Self::System => "system resolver".to_string(),
            Self::Custom(servers) if servers.len() == 1 => format!("custom DNS ({})", servers[0]),
            Self::Custom(servers) => format!("custom DNS ({} servers)", servers.len()),
            Self::Fallback => "public fallback resolver".to_string(),
        }
    }
}

/// Async DNS resolver; read-only once built and safe to share across probes
pub struct DnsManager {
    resolver: TokioAsyncResolver,
    source: ResolverSource,
}

impl DnsManager {
    /// Resolver from the host's system configuration
    pub fn from_system(lookup_timeout: Duration) -> Result<Self> {
        let (config, mut opts) = system_conf::read_system_conf()
            .map_err(|e| AppError::dns_resolution(format!("Failed to read system DNS config: {}", e)))?;
        tune_opts(&mut opts, lookup_timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            source: ResolverSource::System,
        })
    }

    /// Resolver querying the given servers over UDP with TCP fallback
    pub fn with_servers(servers: &[IpAddr], lookup_timeout: Duration) -> Result<Self> {
        if servers.is_empty() {
            return Err(AppError::config("No DNS servers provided"));
        }

        let mut config = ResolverConfig::new();
        for &server in servers {
            let socket_addr = SocketAddr::new(server, 53);
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Udp));
            config.add_name_server(NameServerConfig::new(socket_addr, Protocol::Tcp));
        }

        let mut opts = ResolverOpts::default();
        tune_opts(&mut opts, lookup_timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            source: ResolverSource::Custom(servers.to_vec()),
        })
    }

    /// Resolver chosen from configuration; falls back to public resolvers
    /// when the system configuration cannot be read
    pub fn from_config(config: &Config) -> Result<Self> {
        let servers = config.dns_server_addrs()?;
        if !servers.is_empty() {
            return Self::with_servers(&servers, config.probe_timeout());
        }

        Self::from_system(config.probe_timeout()).or_else(|_| {
            let mut opts = ResolverOpts::default();
            tune_opts(&mut opts, config.probe_timeout());
            Ok(Self {
                resolver: TokioAsyncResolver::tokio(ResolverConfig::cloudflare(), opts),
                source: ResolverSource::Fallback,
            })
        })
    }

    pub fn source(&self) -> &ResolverSource {
        &self.source
    }

    /// Resolve a host to its addresses; IP literals are returned as-is
    pub async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let response = self
            .resolver
            .lookup_ip(host)
            .await
            .map_err(|e| AppError::dns_resolution(format!("Failed to resolve host {}: {}", host, e)))?;

        let ips: Vec<IpAddr> = response.iter().collect();
        if ips.is_empty() {
            return Err(AppError::dns_resolution(format!("No addresses found for {}", host)));
        }

        Ok(ips)
    }

    /// First address of a host, preferring IPv4
    pub async fn resolve_one(&self, host: &str) -> Result<IpAddr> {
        let ips = self.resolve(host).await?;
        ips.iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| ips.first())
            .copied()
            .ok_or_else(|| AppError::dns_resolution(format!("No addresses found for {}", host)))
    }
}

fn tune_opts(opts: &mut ResolverOpts, lookup_timeout: Duration) {
    opts.timeout = lookup_timeout;
    opts.attempts = 1;
}
