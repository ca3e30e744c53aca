use super::{within, Probe};
use crate::{
    defaults::TUNNEL_PROBE_PORT,
    dns::DnsManager,
    error::{AppError, Result},
    models::{Endpoint, ProbeOutcome},
    types::format_duration,
};
use async_trait::async_trait;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::net::TcpStream;

/// Heuristic tunnel feasibility: can a TCP connection reach the TLS port at all?
///
/// No tunnel protocol is negotiated. The outcome is always marked approximate.
pub struct TunnelProbe {
    dns: Arc<DnsManager>,
    port: u16,
}

impl TunnelProbe {
    pub fn new(dns: Arc<DnsManager>) -> Self {
        Self::with_port(dns, TUNNEL_PROBE_PORT)
    }

    pub fn with_port(dns: Arc<DnsManager>, port: u16) -> Self {
        Self { dns, port }
    }

    async fn check(&self, endpoint: &Endpoint) -> Result<String> {
        let host = endpoint.host();
        let ip = self
            .dns
            .resolve_one(host)
            .await
            .map_err(|error| error.with_message(format!("Approximation unavailable: {}", error.message())))?;

        let started = Instant::now();
        TcpStream::connect((ip, self.port)).await.map_err(|e| {
            AppError::network(format!(
                "Approximation: TCP port {} on {} is unreachable ({}); a tunnel over it is unlikely to work",
                self.port, host, e
            ))
        })?;

        Ok(format!(
            "Approximation: TCP port {} on {} accepted a connection in {}; a tunnel may be feasible, \
             but no tunnel protocol was negotiated",
            self.port,
            host,
            format_duration(started.elapsed())
        ))
    }
}

#[async_trait]
impl Probe for TunnelProbe {
    fn name(&self) -> String {
        "Tunnel Feasibility".to_string()
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let what = format!("Approximation: TCP connect to {}:{}", endpoint.host(), self.port);
        ProbeOutcome::from_result(self.name(), within(timeout, &what, self.check(endpoint)).await).approximate()
    }
}
