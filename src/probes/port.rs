use super::{within, Probe};
use crate::{
    dns::DnsManager,
    models::{Endpoint, ProbeOutcome},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpStream;

/// TCP connect check for one port
///
/// The connect always gets the full `connect_timeout`. Whatever is left of
/// the run budget bounds the DNS lookup, so a slow lookup shows up as
/// "could not be checked" rather than as a closed port.
pub struct PortProbe {
    dns: Arc<DnsManager>,
    port: u16,
    connect_timeout: Duration,
}

impl PortProbe {
    pub fn new(dns: Arc<DnsManager>, port: u16, connect_timeout: Duration) -> Self {
        Self {
            dns,
            port,
            connect_timeout,
        }
    }
}

#[async_trait]
impl Probe for PortProbe {
    fn name(&self) -> String {
        format!("Port {}", self.port)
    }

    async fn run(&self, endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
        let lookup_budget = timeout.saturating_sub(self.connect_timeout);
        let what = format!("DNS lookup for {}", endpoint.host());
        let ip = match within(lookup_budget, &what, self.dns.resolve_one(endpoint.host())).await {
            Ok(ip) => ip,
            Err(error) => {
                let detail = format!("Port {} could not be checked: {}", self.port, error.message());
                return ProbeOutcome::from_result(self.name(), Err(error.with_message(detail)));
            }
        };

        // Refused and unanswered connections both count as closed
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect((ip, self.port))).await {
            Ok(Ok(_stream)) => ProbeOutcome::passed(self.name(), format!("Port {} is open.", self.port)),
            _ => ProbeOutcome::failed(self.name(), format!("Port {} is closed.", self.port)),
        }
    }
}
